//! REST endpoints for tasks and the quick planner.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::filter::{TaskFilter, TaskStats, search};
use super::model::{Priority, Task, TaskStatus};
use super::planner::split_goal_to_tasks;
use crate::app::AppState;
use crate::error::{ApiError, ApiResult, require_len};

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatus {
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub task_id: String,
    pub deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub goal: String,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub created_task_ids: Vec<String>,
    pub titles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_tasks: Option<Vec<String>>,
}

/// POST /tasks
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = body?;
    require_len("title", &req.title, 1)?;

    let task = state.tasks.create(Task::new(req.title, req.details, req.priority)).await;
    state
        .audit
        .record(
            "task.create",
            format!("Task created: {}", task.title),
            json!({"task_id": task.id, "priority": task.priority}),
        )
        .await;
    Ok(Json(task))
}

/// GET /tasks
async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.tasks.list().await)
}

/// PATCH /tasks/{id}
async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatus>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = body?;
    let task = state
        .tasks
        .update(&id, |t| t.set_status(req.status))
        .await
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))?;

    state
        .audit
        .record(
            "task.status",
            format!("Task status updated: {}", task.title),
            json!({"task_id": task.id, "status": task.status}),
        )
        .await;
    Ok(Json(task))
}

/// DELETE /tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.tasks.delete(&id).await;
    if deleted {
        state
            .audit
            .record("task.delete", "Task deleted", json!({"task_id": id}))
            .await;
    }
    Json(DeleteResponse { task_id: id, deleted })
}

/// GET /tasks/filter?priority=&status=&date_from=&date_to=&title_query=
async fn filter_tasks(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(pairs) = query?;
    let filter = TaskFilter::from_query_pairs(&pairs)?;
    Ok(Json(filter.apply(state.tasks.list().await)))
}

/// GET /tasks/search?query=
async fn search_tasks(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(q) = query?;
    Ok(Json(search(state.tasks.list().await, &q.query)))
}

/// GET /tasks/stats
async fn task_stats(State(state): State<AppState>) -> Json<TaskStats> {
    Json(TaskStats::from_tasks(&state.tasks.list().await))
}

async fn create_planned(
    state: &AppState,
    req: PlanRequest,
) -> ApiResult<(Vec<String>, Vec<String>)> {
    require_len("goal", &req.goal, 3)?;
    let titles = split_goal_to_tasks(&req.goal);
    let mut ids = Vec::with_capacity(titles.len());
    for title in &titles {
        let task = state.tasks.create(Task::new(title.clone(), "", req.priority)).await;
        ids.push(task.id);
    }
    Ok((ids, titles))
}

/// POST /plan/quick
async fn quick_plan(
    State(state): State<AppState>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> ApiResult<Json<PlanResponse>> {
    let Json(req) = body?;
    let (created_task_ids, titles) = create_planned(&state, req).await?;
    Ok(Json(PlanResponse {
        created_task_ids,
        titles,
        existing_tasks: None,
    }))
}

/// POST /plan/quick_with_existing
async fn quick_plan_with_existing(
    State(state): State<AppState>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> ApiResult<Json<PlanResponse>> {
    let Json(req) = body?;
    let (created_task_ids, titles) = create_planned(&state, req).await?;
    let existing = state.tasks.list().await.into_iter().map(|t| t.title).collect();
    Ok(Json(PlanResponse {
        created_task_ids,
        titles,
        existing_tasks: Some(existing),
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task).get(list_tasks))
        .route("/tasks/filter", get(filter_tasks))
        .route("/tasks/search", get(search_tasks))
        .route("/tasks/stats", get(task_stats))
        .route("/tasks/{id}", patch(update_task_status).delete(delete_task))
        .route("/plan/quick", post(quick_plan))
        .route("/plan/quick_with_existing", post(quick_plan_with_existing))
}
