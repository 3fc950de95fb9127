//! Retrying provider: one overall deadline around a bounded number of
//! transport-level retries with exponential backoff.
//!
//! Callers see a single `Result`: either the first successful response or
//! the error from the last attempt. No call outlives the deadline, including
//! the sleeps between attempts.

use async_trait::async_trait;
use scribbly_core::error::ProviderError;
use scribbly_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// A provider that retries transient failures of an inner provider.
pub struct RetryingProvider {
    inner: Arc<dyn scribbly_core::Provider>,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingProvider {
    /// Wrap `inner` with a 60s overall deadline and 3 retries.
    pub fn new(inner: Arc<dyn scribbly_core::Provider>) -> Self {
        Self {
            inner,
            timeout: Duration::from_secs(60),
            max_retries: 3,
            backoff: Duration::from_millis(500),
        }
    }

    /// Set the deadline for the whole call, retries and backoff included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many times a transient failure is retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry; it doubles on each further retry.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry))
    }

    fn timed_out(&self) -> ProviderError {
        ProviderError::Timeout(format!(
            "Provider '{}' timed out after {}s",
            self.inner.name(),
            self.timeout.as_secs()
        ))
    }
}

#[async_trait]
impl scribbly_core::Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let deadline = Instant::now() + self.timeout;
        let attempts = self.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match tokio::time::timeout_at(deadline, self.inner.complete(request.clone()))
                .await
            {
                Ok(Ok(response)) => {
                    if attempt > 1 {
                        info!(provider = %self.inner.name(), attempt, "Provider recovered after retry");
                    }
                    return Ok(response);
                }
                Ok(Err(e)) => e,
                Err(_) => self.timed_out(),
            };

            let delay = match &error {
                ProviderError::RateLimited { retry_after_secs } => {
                    Duration::from_secs(*retry_after_secs).max(self.delay_for(attempt - 1))
                }
                _ => self.delay_for(attempt - 1),
            };
            let remaining = deadline.saturating_duration_since(Instant::now());

            if !error.is_transient() || attempt >= attempts || delay >= remaining {
                warn!(
                    provider = %self.inner.name(),
                    attempt,
                    remaining_ms = remaining.as_millis() as u64,
                    error = %error,
                    "Provider call failed, giving up"
                );
                return Err(error);
            }

            warn!(
                provider = %self.inner.name(),
                attempt,
                total = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Provider call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Single check under the same deadline; a check that runs out of time
    /// reports unhealthy rather than failing.
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.health_check()).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribbly_core::Provider;
    use scribbly_core::message::Message;
    use std::sync::Mutex;

    /// Fails with the scripted errors in order, then succeeds.
    struct FlakyProvider {
        errors: Mutex<Vec<ProviderError>>,
        call_count: Mutex<usize>,
    }

    impl FlakyProvider {
        fn new(errors: Vec<ProviderError>) -> Self {
            Self {
                errors: Mutex::new(errors),
                call_count: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl scribbly_core::Provider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            let mut errors = self.errors.lock().unwrap();
            if errors.is_empty() {
                Ok(ProviderResponse {
                    message: Message::assistant("success"),
                    usage: None,
                    model: "test-model".into(),
                })
            } else {
                Err(errors.remove(0))
            }
        }
    }

    /// A provider that hangs forever (for timeout testing).
    struct HangingProvider {
        call_count: Mutex<usize>,
    }

    #[async_trait]
    impl scribbly_core::Provider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    /// Never answers its health check.
    struct SilentUpstream;

    #[async_trait]
    impl scribbly_core::Provider for SilentUpstream {
        fn name(&self) -> &str {
            "silent"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> std::result::Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Network("unused".into()))
        }

        async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(true)
        }
    }

    fn test_request() -> ProviderRequest {
        ProviderRequest::new("test", vec![Message::user("hello")])
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_succeeds() {
        let inner = Arc::new(FlakyProvider::new(vec![]));
        let provider = RetryingProvider::new(inner.clone());

        let response = provider.complete(test_request()).await.unwrap();
        assert_eq!(response.message.content, "success");
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures() {
        let inner = Arc::new(FlakyProvider::new(vec![
            ProviderError::Network("conn reset".into()),
            ProviderError::ApiError {
                status_code: 502,
                message: "Bad Gateway".into(),
            },
        ]));
        let provider = RetryingProvider::new(inner.clone());

        assert!(provider.complete(test_request()).await.is_ok());
        assert_eq!(inner.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let inner = Arc::new(FlakyProvider::new(vec![
            ProviderError::Network("down".into()),
            ProviderError::Network("down".into()),
            ProviderError::Network("down".into()),
            ProviderError::Network("down".into()),
            ProviderError::Network("down".into()),
        ]));
        let provider = RetryingProvider::new(inner.clone()).with_max_retries(3);

        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
        assert_eq!(inner.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_is_not_retried() {
        let inner = Arc::new(FlakyProvider::new(vec![ProviderError::AuthenticationFailed(
            "bad key".into(),
        )]));
        let provider = RetryingProvider::new(inner.clone());

        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_call_is_bounded_by_deadline() {
        let inner = Arc::new(HangingProvider {
            call_count: Mutex::new(0),
        });
        let provider = RetryingProvider::new(inner.clone())
            .with_timeout(Duration::from_secs(60))
            .with_max_retries(2);

        let started = Instant::now();
        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
        assert_eq!(started.elapsed(), Duration::from_secs(60));
        assert_eq!(*inner.call_count.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn long_retry_after_gives_up_immediately() {
        let inner = Arc::new(FlakyProvider::new(vec![ProviderError::RateLimited {
            retry_after_secs: 86_400,
        }]));
        let provider = RetryingProvider::new(inner.clone());

        let started = Instant::now();
        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { retry_after_secs: 86_400 }));
        assert!(started.elapsed() <= Duration::from_secs(60));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn short_retry_after_is_honoured() {
        let inner = Arc::new(FlakyProvider::new(vec![ProviderError::RateLimited {
            retry_after_secs: 5,
        }]));
        let provider = RetryingProvider::new(inner.clone());

        let started = Instant::now();
        assert!(provider.complete(test_request()).await.is_ok());
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_stops_at_deadline() {
        let inner = Arc::new(FlakyProvider::new(vec![
            ProviderError::Network("down".into()),
            ProviderError::Network("down".into()),
            ProviderError::Network("down".into()),
        ]));
        // 4s, then 8s: the second sleep would cross the 10s deadline.
        let provider = RetryingProvider::new(inner.clone())
            .with_timeout(Duration::from_secs(10))
            .with_backoff(Duration::from_secs(4));

        let started = Instant::now();
        let err = provider.complete(test_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
        assert_eq!(inner.calls(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_health_check_reports_unhealthy() {
        let provider =
            RetryingProvider::new(Arc::new(SilentUpstream)).with_timeout(Duration::from_secs(5));
        assert!(!provider.health_check().await.unwrap());

        let healthy = RetryingProvider::new(Arc::new(FlakyProvider::new(vec![])));
        assert!(healthy.health_check().await.unwrap());
    }

    #[test]
    fn backoff_doubles() {
        let provider = RetryingProvider::new(Arc::new(FlakyProvider::new(vec![])))
            .with_backoff(Duration::from_millis(100));
        assert_eq!(provider.delay_for(0), Duration::from_millis(100));
        assert_eq!(provider.delay_for(1), Duration::from_millis(200));
        assert_eq!(provider.delay_for(2), Duration::from_millis(400));
    }
}
