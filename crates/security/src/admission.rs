//! Admission control — per-client sliding-window rate limiter.
//!
//! Tracks admitted-call timestamps per client key (usually the peer IP).
//! Thread-safe via `std::sync::Mutex` (non-async, held briefly, never across
//! an await point). Timestamps come from `tokio::time::Instant` so tests can
//! drive the window with a paused clock.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Clients tracked before idle windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// The decision for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The call was admitted and charged to the client's window.
    Allowed,
    /// The window is full; a slot frees up after `retry_after`.
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Sliding-window limiter: at most `max_requests` admitted calls per client
/// in any trailing `window`.
#[derive(Debug)]
pub struct AdmissionController {
    max_requests: usize,
    window: Duration,
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl AdmissionController {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether `client_id` may make a call now.
    ///
    /// Prunes timestamps older than the window, then denies if the remaining
    /// count is at the cap; otherwise records `now` and admits. A charged
    /// slot is never refunded.
    pub fn admit(&self, client_id: &str) -> Admission {
        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        if clients.len() > SWEEP_THRESHOLD {
            let before = clients.len();
            clients.retain(|_, stamps| {
                stamps
                    .back()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
            debug!(before, after = clients.len(), "Swept idle rate windows");
        }

        let stamps = clients.entry(client_id.to_string()).or_default();
        while stamps
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            stamps.pop_front();
        }

        if stamps.len() >= self.max_requests {
            let retry_after = stamps
                .front()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            warn!(
                client = %client_id.chars().take(40).collect::<String>(),
                in_window = stamps.len(),
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            return Admission::Denied { retry_after };
        }

        stamps.push_back(now);
        Admission::Allowed
    }

    /// Admitted calls currently inside `client_id`'s window.
    pub fn in_window(&self, client_id: &str) -> usize {
        let now = Instant::now();
        let clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.get(client_id).map_or(0, |stamps| {
            stamps
                .iter()
                .filter(|t| now.duration_since(**t) < self.window)
                .count()
        })
    }

    /// Number of client windows currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for AdmissionController {
    /// Ten calls per minute.
    fn default() -> Self {
        Self::new(10, Duration::from_secs(60))
    }
}
