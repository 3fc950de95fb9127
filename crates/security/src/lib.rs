//! Request policy enforcement for Scribbly.
//!
//! Provides:
//! - **Content safety**: case-insensitive denylist screening of input and output text
//! - **Admission control**: per-client sliding-window rate limiting

pub mod admission;
pub mod safety;

pub use admission::{Admission, AdmissionController};
pub use safety::{ContentSafetyFilter, Violation};
