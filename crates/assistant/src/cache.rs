//! Fingerprint cache — TTL cache of finished results keyed by a SHA-256
//! digest of the request's identity.
//!
//! Entries are immutable once written; a later write for the same
//! fingerprint replaces the entry wholesale. Expired entries read as a miss
//! and are only dropped by [`FingerprintCache::purge_expired`].

use scribbly_core::assistant::{AssistantRequest, AssistantResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;

/// Hex-encoded SHA-256 of `content|mode|tone|include_tags`.
///
/// `target_lang` is not part of the key: two translate requests that differ
/// only in target language share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(request: &AssistantRequest) -> Self {
        let raw = format!(
            "{}|{}|{}|{}",
            request.content, request.mode, request.tone, request.include_tags
        );
        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cached result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub created_at: Instant,
    pub value: AssistantResult,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.created_at) < ttl
    }
}

/// Process-wide result cache.
///
/// Readers take the read lock and clone the entry out, so a concurrent
/// writer can never expose a partially written value.
#[derive(Debug)]
pub struct FingerprintCache {
    ttl: Duration,
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
}

impl FingerprintCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fresh value for `fingerprint`, or `None` on miss or expiry.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<AssistantResult> {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(fingerprint)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Store `value`, superseding any previous entry. Last writer wins.
    pub fn put(&self, fingerprint: Fingerprint, value: AssistantResult) {
        let entry = CacheEntry {
            fingerprint: fingerprint.clone(),
            created_at: Instant::now(),
            value,
        };
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(fingerprint, entry);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        before - entries.len()
    }

    /// Stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for FingerprintCache {
    /// 24-hour TTL.
    fn default() -> Self {
        Self::new(Duration::from_secs(60 * 60 * 24))
    }
}
