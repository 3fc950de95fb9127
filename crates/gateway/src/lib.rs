//! HTTP API gateway for Scribbly.
//!
//! Exposes the content assistant over REST:
//! - `POST /ai/assistant` runs one request through the pipeline
//! - `GET /ai/stats` reports pipeline counters
//! - `GET /health` for monitoring
//!
//! Built on Axum. The client identity used for admission control is the
//! peer address, so the server must be started with connect info.

pub mod error;

use axum::extract::{ConnectInfo, DefaultBodyLimit, FromRequestParts, State};
use axum::http::request::Parts;
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use scribbly_assistant::{AssistantOrchestrator, FingerprintCache, StatsSnapshot};
use scribbly_core::assistant::{AssistantRequest, AssistantResult};

pub use error::ApiError;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: AssistantOrchestrator,
    pub started_at: DateTime<Utc>,
}

impl GatewayState {
    pub fn new(orchestrator: AssistantOrchestrator) -> Self {
        Self {
            orchestrator,
            started_at: Utc::now(),
        }
    }
}

type SharedState = Arc<GatewayState>;

/// Client identity for admission control: the peer IP, or `"unknown"` when
/// the server was not started with connect info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(ClientId(id))
    }
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Request body size limit (64 KiB)
/// - Permissive CORS for the mini-program and admin web clients
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ai/assistant", post(assistant_handler))
        .route("/ai/stats", get(stats_handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: scribbly_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let orchestrator = AssistantOrchestrator::from_config(&config);
    spawn_cache_sweeper(
        orchestrator.cache().clone(),
        Duration::from_secs(config.gateway.cache_sweep_secs),
    );

    let state = Arc::new(GatewayState::new(orchestrator));
    let app = build_router(state);

    info!(addr = %addr, provider = config.has_api_key(), "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Periodically drop expired cache entries.
fn spawn_cache_sweeper(cache: Arc<FingerprintCache>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = cache.len(), "Swept expired cache entries");
            }
        }
    })
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider_enabled: bool,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider_enabled: state.orchestrator.provider_enabled(),
    })
}

async fn assistant_handler(
    State(state): State<SharedState>,
    ClientId(client): ClientId,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantResult>, ApiError> {
    let result = state.orchestrator.run(&request, &client).await?;
    Ok(Json(result))
}

#[derive(Serialize)]
struct StatsResponse {
    started_at: DateTime<Utc>,
    uptime_secs: i64,
    cached_results: usize,
    tracked_clients: usize,
    #[serde(flatten)]
    counters: StatsSnapshot,
}

async fn stats_handler(State(state): State<SharedState>) -> Json<StatsResponse> {
    let orchestrator = &state.orchestrator;
    Json(StatsResponse {
        started_at: state.started_at,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        cached_results: orchestrator.cache().len(),
        tracked_clients: orchestrator.admission().tracked_clients(),
        counters: orchestrator.stats().snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use scribbly_security::{AdmissionController, ContentSafetyFilter};
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        test_state_with(AdmissionController::default())
    }

    fn test_state_with(admission: AdmissionController) -> SharedState {
        let orchestrator = AssistantOrchestrator::new(
            Arc::new(ContentSafetyFilter::default()),
            Arc::new(admission),
            Arc::new(FingerprintCache::default()),
        );
        Arc::new(GatewayState::new(orchestrator))
    }

    fn assistant_request(body: serde_json::Value, peer: [u8; 4]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ai/assistant")
            .header(header::CONTENT_TYPE, "application/json")
            .extension(ConnectInfo(SocketAddr::from((peer, 40_000))))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider_enabled"], false);
    }

    #[tokio::test]
    async fn assistant_defaults_and_full_shape() {
        let app = build_router(test_state());
        let req = assistant_request(serde_json::json!({"content": "I love food and travel"}), [10, 0, 0, 1]);

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["summary"], "I love food and travel");
        assert_eq!(body["tags"], serde_json::json!(["travel", "food"]));
        for key in ["suggestions", "translated_content", "vibe"] {
            assert!(body.get(key).is_some(), "missing key {key}");
        }
    }

    #[tokio::test]
    async fn empty_content_is_bad_request() {
        let app = build_router(test_state());
        let req = assistant_request(serde_json::json!({"content": "   ", "mode": "tags"}), [10, 0, 0, 1]);

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["detail"], "Content is required");
    }

    #[tokio::test]
    async fn missing_content_is_rejected() {
        let app = build_router(test_state());
        let req = assistant_request(serde_json::json!({"mode": "summary"}), [10, 0, 0, 1]);

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn sensitive_content_is_a_normal_response() {
        let app = build_router(test_state());
        let req = assistant_request(serde_json::json!({"content": "an EVIL plan"}), [10, 0, 0, 1]);

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "sensitive");
        assert!(body["summary"].is_null());
        assert_eq!(body["tags"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn rate_limited_client_gets_429_with_retry_after() {
        let state = test_state_with(AdmissionController::new(1, Duration::from_secs(60)));
        let app = build_router(state);

        let first = app
            .clone()
            .oneshot(assistant_request(serde_json::json!({"content": "one"}), [10, 0, 0, 7]))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .clone()
            .oneshot(assistant_request(serde_json::json!({"content": "two"}), [10, 0, 0, 7]))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));
        let detail = json_body(second).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("AI request limit exceeded"));

        // A different peer has its own window.
        let other = app
            .oneshot(assistant_request(serde_json::json!({"content": "two"}), [10, 0, 0, 8]))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(test_state());
        let content = "x".repeat(BODY_LIMIT_BYTES + 1);
        let req = assistant_request(serde_json::json!({"content": content}), [10, 0, 0, 1]);

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn stats_reflect_handled_requests() {
        let state = test_state();
        let app = build_router(state.clone());

        for content in ["music night", "music night", ""] {
            let _ = app
                .clone()
                .oneshot(assistant_request(serde_json::json!({"content": content}), [10, 0, 0, 1]))
                .await
                .unwrap();
        }

        let response = app
            .oneshot(Request::builder().uri("/ai/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["requests"], 3);
        assert_eq!(body["cache_hits"], 1);
        assert_eq!(body["empty_inputs"], 1);
        assert_eq!(body["cached_results"], 1);
        assert_eq!(body["tracked_clients"], 1);
    }

    #[tokio::test]
    async fn start_rejects_zero_sweep_interval() {
        let mut config = scribbly_config::AppConfig::default();
        config.gateway.port = 0;
        config.gateway.cache_sweep_secs = 0;
        let err = start(config).await.unwrap_err();
        assert!(err.to_string().contains("cache_sweep_secs"));
    }

    #[tokio::test]
    async fn client_id_falls_back_without_connect_info() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let ClientId(id) = ClientId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id, "unknown");
    }
}
