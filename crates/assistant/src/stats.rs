//! Pipeline counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters for every exit of the pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    requests: AtomicU64,
    empty_inputs: AtomicU64,
    sensitive_inputs: AtomicU64,
    sensitive_outputs: AtomicU64,
    rate_limited: AtomicU64,
    cache_hits: AtomicU64,
    provider_calls: AtomicU64,
    provider_failures: AtomicU64,
    fallbacks: AtomicU64,
    completed: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub empty_inputs: u64,
    pub sensitive_inputs: u64,
    pub sensitive_outputs: u64,
    pub rate_limited: u64,
    pub cache_hits: u64,
    pub provider_calls: u64,
    pub provider_failures: u64,
    pub fallbacks: u64,
    pub completed: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        bump(&self.requests);
    }
    pub fn record_empty_input(&self) {
        bump(&self.empty_inputs);
    }
    pub fn record_sensitive_input(&self) {
        bump(&self.sensitive_inputs);
    }
    pub fn record_sensitive_output(&self) {
        bump(&self.sensitive_outputs);
    }
    pub fn record_rate_limited(&self) {
        bump(&self.rate_limited);
    }
    pub fn record_cache_hit(&self) {
        bump(&self.cache_hits);
    }
    pub fn record_provider_call(&self) {
        bump(&self.provider_calls);
    }
    pub fn record_provider_failure(&self) {
        bump(&self.provider_failures);
    }
    pub fn record_fallback(&self) {
        bump(&self.fallbacks);
    }
    pub fn record_completed(&self) {
        bump(&self.completed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            requests: load(&self.requests),
            empty_inputs: load(&self.empty_inputs),
            sensitive_inputs: load(&self.sensitive_inputs),
            sensitive_outputs: load(&self.sensitive_outputs),
            rate_limited: load(&self.rate_limited),
            cache_hits: load(&self.cache_hits),
            provider_calls: load(&self.provider_calls),
            provider_failures: load(&self.provider_failures),
            fallbacks: load(&self.fallbacks),
            completed: load(&self.completed),
        }
    }
}
