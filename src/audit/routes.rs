//! REST endpoints for the audit trail and retention maintenance.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::log::{AuditEvent, DEFAULT_LIST_LIMIT};
use crate::app::AppState;
use crate::error::{ApiResult, require_len};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub event_type: String,
    pub message: String,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub retention_days: u32,
    pub audit_events_removed: usize,
}

/// GET /audit?limit=
async fn list_events(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<AuditEvent>>> {
    let Query(q) = query?;
    Ok(Json(state.audit.recent(q.limit.unwrap_or(DEFAULT_LIST_LIMIT)).await))
}

/// POST /audit
async fn create_event(
    State(state): State<AppState>,
    body: Result<Json<CreateEvent>, JsonRejection>,
) -> ApiResult<Json<AuditEvent>> {
    let Json(req) = body?;
    require_len("event_type", &req.event_type, 2)?;
    require_len("message", &req.message, 1)?;
    Ok(Json(state.audit.log(req.event_type, req.message, req.meta).await))
}

/// POST /maintenance/cleanup
async fn cleanup(State(state): State<AppState>) -> Json<CleanupResponse> {
    let retention_days = state.profile.get().await.data_retention_days;
    let audit_events_removed = state.audit.cleanup(retention_days).await;
    Json(CleanupResponse {
        retention_days,
        audit_events_removed,
    })
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit", get(list_events).post(create_event))
        .route("/maintenance/cleanup", post(cleanup))
}
