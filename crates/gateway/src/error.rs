//! Mapping of pipeline errors onto HTTP responses.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use scribbly_core::error::AssistantError;
use serde_json::json;

/// An [`AssistantError`] on its way out of a handler.
///
/// Empty input becomes `400`, a full admission window becomes `429` with a
/// `Retry-After` header. The body is always `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub AssistantError);

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.0.to_string() }));
        match self.0 {
            AssistantError::EmptyInput => (StatusCode::BAD_REQUEST, body).into_response(),
            AssistantError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_sets_retry_after() {
        let response = ApiError(AssistantError::RateLimited {
            retry_after_secs: 42,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn empty_input_is_bad_request() {
        let response = ApiError::from(AssistantError::EmptyInput).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!response.headers().contains_key(header::RETRY_AFTER));
    }
}
