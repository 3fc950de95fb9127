//! # Scribbly Core
//!
//! Domain types, traits, and error definitions for the Scribbly content
//! assistant. This crate has **no framework dependencies**: it defines the
//! request/result model and the provider seam that every other crate
//! implements against.
//!
//! ## Design Philosophy
//!
//! The external text-generation backend is a trait here. Implementations live
//! in `scribbly-providers`. This enables:
//! - Swapping providers via configuration
//! - Easy testing with stub providers that count their calls
//! - Clean dependency graph (all crates depend inward on core)

pub mod assistant;
pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use assistant::{AssistantRequest, AssistantResult, Mode, Status, Tone, Vibe};
pub use error::{AssistantError, ProviderError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
