//! Agent HTTP routes — A2A JSON-RPC, health, agent card, boards, metrics.

pub mod card;
pub mod rpc;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AgentConfig;
use crate::models::rpc::JsonRpcResponse;
use crate::services::agent::ChessAgent;
use crate::services::artifact_service::is_board_file;

/// Shared state for agent route handlers.
#[derive(Clone)]
pub struct AgentRouterState {
    pub agent: Arc<ChessAgent>,
    pub http: reqwest::Client,
    pub config: AgentConfig,
    pub metrics: Option<PrometheusHandle>,
}

/// Build the agent's Axum router.
pub fn agent_router(state: AgentRouterState) -> Router {
    Router::new()
        // A2A
        .route("/a2a/chess", post(rpc_handler))
        .route("/.well-known/agent.json", get(card_handler))
        // Ops
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Board images
        .route("/boards/{file}", get(board_handler))
        .with_state(state)
}

/// Tracing, permissive CORS and a request timeout answered with 408.
pub fn with_layers(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn rpc_handler(
    State(state): State<AgentRouterState>,
    body: Bytes,
) -> (StatusCode, Json<JsonRpcResponse>) {
    let (status, response) = rpc::handle(&state, &body).await;
    (status, Json(response))
}

async fn card_handler(State(state): State<AgentRouterState>) -> Json<serde_json::Value> {
    Json(card::agent_card(&state.config))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "agent": "chess" }))
}

async fn board_handler(
    State(state): State<AgentRouterState>,
    Path(file): Path<String>,
) -> Result<Response, StatusCode> {
    if !is_board_file(&file) {
        return Err(StatusCode::NOT_FOUND);
    }
    let svg = tokio::fs::read(state.config.board_dir.join(&file))
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn metrics_handler(State(state): State<AgentRouterState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
