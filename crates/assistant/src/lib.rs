//! The content assistant pipeline.
//!
//! Each call walks a fixed sequence:
//!
//! 1. **Reject** empty input
//! 2. **Screen** the input against the denylist
//! 3. **Admit** the client through the sliding-window rate limiter
//! 4. **Look up** the request fingerprint in the TTL cache
//! 5. **Generate** through the provider with a per-mode JSON contract
//! 6. **Validate** the provider output; on any failure use local heuristics
//! 7. **Screen** the output, then cache and return it
//!
//! Provider trouble degrades quality, never availability: a well-formed,
//! non-sensitive, admitted request always gets a usable result.

pub mod adapter;
pub mod cache;
pub mod heuristic;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod stats;

pub use adapter::ProviderAdapter;
pub use cache::{CacheEntry, Fingerprint, FingerprintCache};
pub use heuristic::HeuristicFallbackEngine;
pub use orchestrator::{AssistantOrchestrator, GenerationFailure};
pub use parse::OutputError;
pub use stats::{PipelineStats, StatsSnapshot};
