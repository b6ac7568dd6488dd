//! Health, status, and model connectivity endpoints.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use super::probes::{IntegrationStatus, ping_primary};
use crate::app::AppState;
use crate::error::{ApiError, ApiResult, require_len};
use crate::llm::{ChatMessage, CompletionRequest};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "app": state.config.app_name,
        "env": state.config.app_env,
    }))
}

async fn database_statuses(state: &AppState) -> Value {
    let (primary, graph) = tokio::join!(
        ping_primary(state.primary.as_ref(), state.config.backend_timeout),
        state.graph.ping(),
    );
    json!({ "primary": primary, "graph": graph })
}

fn integrations(state: &AppState) -> Value {
    json!({
        "nylas": IntegrationStatus::check("Nylas", state.config.nylas_configured),
        "plaid": IntegrationStatus::check("Plaid", state.config.plaid_configured),
    })
}

/// GET /status/overview
async fn overview(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "app": state.config.app_name,
        "env": state.config.app_env,
        "ollama_model": state.config.ollama_model,
        "integrations": integrations(&state),
        "databases": database_statuses(&state).await,
    }))
}

/// GET /status/metrics
async fn metrics(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "uptime_seconds": state.uptime_seconds() }))
}

/// GET /db/ping
async fn db_ping(State(state): State<AppState>) -> Json<Value> {
    Json(database_statuses(&state).await)
}

/// GET /integrations/nylas
async fn nylas_status(State(state): State<AppState>) -> Json<IntegrationStatus> {
    Json(IntegrationStatus::check("Nylas", state.config.nylas_configured))
}

/// GET /integrations/plaid
async fn plaid_status(State(state): State<AppState>) -> Json<IntegrationStatus> {
    Json(IntegrationStatus::check("Plaid", state.config.plaid_configured))
}

/// GET /llm/ping
async fn llm_ping(State(state): State<AppState>) -> Json<Value> {
    match state.llm.ping().await {
        Ok(models) => Json(json!({"ok": true, "models": models, "message": "Ollama reachable"})),
        Err(e) => Json(json!({"ok": false, "models": 0, "message": e.to_string()})),
    }
}

/// POST /llm/chat
async fn llm_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    if req.messages.is_empty() {
        return Err(ApiError::Validation("messages must not be empty".into()));
    }
    for message in &req.messages {
        require_len("content", &message.content, 1)?;
    }
    let resp = state.llm.complete(CompletionRequest::new(req.messages)).await?;
    Ok(Json(json!({
        "ok": true,
        "model": resp.model,
        "message": resp.content,
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/status/overview", get(overview))
        .route("/status/metrics", get(metrics))
        .route("/db/ping", get(db_ping))
        .route("/integrations/nylas", get(nylas_status))
        .route("/integrations/plaid", get(plaid_status))
        .route("/llm/ping", get(llm_ping))
        .route("/llm/chat", post(llm_chat))
}
