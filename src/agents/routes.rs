//! REST endpoints for the agent router.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::registry::{Agent, AgentInfo, AgentResult};
use super::router::AutoRouteResult;
use crate::app::AppState;
use crate::error::{ApiResult, require_len};

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub task_type: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct AutoRouteRequest {
    pub query: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default = "default_prefer_llm")]
    pub prefer_llm: bool,
}

fn default_prefer_llm() -> bool {
    true
}

/// GET /agents
async fn list_agents() -> Json<Vec<AgentInfo>> {
    Json(Agent::ALL.iter().map(Agent::info).collect())
}

/// POST /agents/route
async fn route_agent(
    State(state): State<AppState>,
    body: Result<Json<RouteRequest>, JsonRejection>,
) -> ApiResult<Json<AgentResult>> {
    let Json(req) = body?;
    Ok(Json(state.agents.route_by_type(&req.task_type, &req.payload)))
}

/// POST /agents/auto
async fn auto_route(
    State(state): State<AppState>,
    body: Result<Json<AutoRouteRequest>, JsonRejection>,
) -> ApiResult<Json<AutoRouteResult>> {
    let Json(req) = body?;
    require_len("query", &req.query, 3)?;
    Ok(Json(state.agents.auto_route(&req.query, &req.payload, req.prefer_llm).await))
}

/// GET /agents/ping
async fn agents_ping(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Agent router ready",
        "ollama": state.llm.model_name(),
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/route", post(route_agent))
        .route("/agents/auto", post(auto_route))
        .route("/agents/ping", get(agents_ping))
}
