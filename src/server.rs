//! HTTP surface: a streaming chat endpoint plus a health probe.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tracing::info;

use crate::error::AgentError;
use crate::services::Orchestrator;
use crate::types::request::ChatRequest;

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .with_state(orchestrator)
}

/// Bind and serve until the process is stopped.
pub async fn serve(orchestrator: Arc<Orchestrator>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");
    axum::serve(listener, router(orchestrator)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// One chat turn. The reply streams as plain text chunks; failures before the
/// first model token map onto structured JSON error responses.
async fn chat(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match orchestrator.handle_turn(request).await {
        Ok(stream) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AgentError) -> Response {
    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_error_payload())).into_response()
}
