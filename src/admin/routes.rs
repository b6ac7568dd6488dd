use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::demo::{DemoSeed, seed_demo};
use crate::app::AppState;

/// Audit events sampled for the analytics summary.
const ANALYTICS_AUDIT_SAMPLE: usize = 200;

/// GET /admin/info
async fn admin_info(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "app": config.app_name,
        "env": config.app_env,
        "uptime_seconds": state.uptime_seconds(),
        "ollama_model": config.ollama_model,
        "cors_origins": config.cors_origins,
        "api_key_configured": config.api_key.is_some(),
        "admin_api_key_configured": config.admin_api_key.is_some(),
        "primary_backend": state.primary.as_ref().map(|b| b.name().to_string()),
    }))
}

/// GET /export/all
async fn export_all(State(state): State<AppState>) -> Json<Value> {
    let (profile, tasks, conversations) = tokio::join!(
        state.profile.get(),
        state.tasks.list(),
        state.conversations.list(),
    );
    Json(json!({
        "profile": profile,
        "tasks": tasks,
        "conversations": conversations,
    }))
}

/// GET /analytics/summary
async fn analytics_summary(State(state): State<AppState>) -> Json<Value> {
    let (tasks, conversations, audit) = tokio::join!(
        state.tasks.list(),
        state.conversations.list(),
        state.audit.recent(ANALYTICS_AUDIT_SAMPLE),
    );
    let messages_total: usize = conversations.iter().map(|c| c.messages.len()).sum();
    Json(json!({
        "tasks_total": tasks.len(),
        "conversations_total": conversations.len(),
        "messages_total": messages_total,
        "audit_events_sample": audit.len(),
    }))
}

/// POST /demo/seed
async fn demo_seed(State(state): State<AppState>) -> Json<DemoSeed> {
    Json(seed_demo(&state.tasks, &state.conversations).await)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/info", get(admin_info))
        .route("/export/all", get(export_all))
        .route("/analytics/summary", get(analytics_summary))
        .route("/demo/seed", post(demo_seed))
}
