//! HTTP transport module for host-summary
//!
//! Axum server exposing `POST /summarize` plus a plain `GET /health`.
//! CORS is open to every origin on every route.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;

use crate::config::Config;
use crate::error::Result;
use crate::generation::{OpenAiChatClient, TextGenerator};
use crate::summary::{HostSummary, SummaryService};

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub service: Arc<SummaryService>,
}

impl HttpState {
    pub fn new(service: SummaryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Extract a string `ip` from the request body. Anything else reads as absent.
fn requested_ip(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("ip").and_then(Value::as_str).map(str::to_owned)
}

/// Summarize endpoint
pub async fn summarize_handler(
    State(state): State<HttpState>,
    body: Bytes,
) -> Result<Json<HostSummary>> {
    let ip = requested_ip(&body);
    let summary = state.service.summarize(ip.as_deref()).await?;
    Ok(Json(summary))
}

async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = tracing::info_span!("request", %request_id, %method, %path);

    async move {
        let start = Instant::now();
        let resp = next.run(req).await;
        tracing::info!(
            status = resp.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "handled request"
        );
        resp
    }
    .instrument(span)
    .await
}

/// Build the application router around a ready service
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/summarize", post(summarize_handler))
        .layer(middleware::from_fn(log_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Wire the configured generation client into a service
pub fn build_service(config: &Config) -> Result<SummaryService> {
    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiChatClient::from_config(config)?);
    Ok(SummaryService::new(config.dataset.path.clone(), generator))
}

/// Start the HTTP server
pub async fn start_http_server(config: Config) -> Result<()> {
    let service = build_service(&config)?;
    tracing::info!(
        "Starting HTTP server on {} (dataset {}, model {})",
        config.server.bind,
        service.dataset_path().display(),
        config.generation.model
    );
    let app = router(HttpState::new(service));

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
