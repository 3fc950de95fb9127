//! Text-generation provider implementations for Scribbly.
//!
//! All providers implement the `scribbly_core::Provider` trait.
//! [`build_from_config`] assembles the configured provider with its
//! timeout and retry policy, or returns `None` when no credential is set.

pub mod openai_compat;
pub mod retry;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use retry::RetryingProvider;
pub use router::build_from_config;
