//! Error types for the Scribbly domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error type; there is no catch-all.

use thiserror::Error;

/// Caller-visible rejections from the assistant pipeline.
///
/// Sensitive content is not in here: it is reported as
/// [`Status::Sensitive`](crate::assistant::Status::Sensitive) on a normal
/// result. Provider failures are not in here either, they are always
/// absorbed by the heuristic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    #[error("Content is required")]
    EmptyInput,

    #[error("AI request limit exceeded. Please try again in {retry_after_secs}s.")]
    RateLimited { retry_after_secs: u64 },
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether a transport-level retry could plausibly succeed.
    ///
    /// Authentication and configuration problems never go away on their own,
    /// and a body that parsed but made no sense will not improve either.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::MalformedResponse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 502,
            message: "Bad Gateway".into(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn rate_limited_mentions_retry_window() {
        let err = AssistantError::RateLimited {
            retry_after_secs: 42,
        };
        assert!(err.to_string().contains("42s"));
    }

    #[test]
    fn transient_classification() {
        assert!(ProviderError::Network("reset".into()).is_transient());
        assert!(ProviderError::Timeout("60s".into()).is_transient());
        assert!(
            ProviderError::ApiError {
                status_code: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !ProviderError::ApiError {
                status_code: 400,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!ProviderError::AuthenticationFailed("bad key".into()).is_transient());
        assert!(!ProviderError::MalformedResponse("no choices".into()).is_transient());
    }
}
