//! REST endpoints for conversations.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::model::{Conversation, ConversationStats, Message};
use super::summary::{SummaryMethod, summarize};
use crate::app::AppState;
use crate::error::{ApiError, ApiResult, require_len};
use crate::llm::ChatRole;

#[derive(Debug, Deserialize)]
pub struct CreateConversation {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default = "default_prefer_llm")]
    pub prefer_llm: bool,
}

fn default_prefer_llm() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub conversation_id: String,
    pub summary: String,
    pub method: SummaryMethod,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Conversation not found".into())
}

/// POST /conversations
async fn create_conversation(
    State(state): State<AppState>,
    body: Result<Json<CreateConversation>, JsonRejection>,
) -> ApiResult<Json<Conversation>> {
    let Json(req) = body?;
    require_len("title", &req.title, 1)?;

    let conversation = state.conversations.create(Conversation::new(req.title)).await;
    state
        .audit
        .record(
            "conversation.create",
            format!("Conversation created: {}", conversation.title),
            json!({"conversation_id": conversation.id}),
        )
        .await;
    Ok(Json(conversation))
}

/// GET /conversations
async fn list_conversations(State(state): State<AppState>) -> Json<Vec<Conversation>> {
    Json(state.conversations.list().await)
}

/// GET /conversations/search?query=
async fn search_conversations(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Conversation>>> {
    let Query(q) = query?;
    let lowered = q.query.to_lowercase();
    let matches = state
        .conversations
        .list()
        .await
        .into_iter()
        .filter(|c| c.matches(&lowered))
        .collect();
    Ok(Json(matches))
}

/// GET /conversations/stats
async fn conversation_stats(State(state): State<AppState>) -> Json<ConversationStats> {
    Json(ConversationStats::from_conversations(&state.conversations.list().await))
}

/// GET /conversations/{id}
async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Conversation>> {
    state.conversations.get(&id).await.map(Json).ok_or_else(not_found)
}

/// POST /conversations/{id}/message
async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AppendMessage>, JsonRejection>,
) -> ApiResult<Json<Conversation>> {
    let Json(req) = body?;
    require_len("content", &req.content, 1)?;

    let message = Message::new(req.role, req.content);
    let conversation = state
        .conversations
        .update(&id, |c| c.messages.push(message.clone()))
        .await
        .ok_or_else(not_found)?;

    state
        .audit
        .record(
            "conversation.message",
            "Message added to conversation",
            json!({"conversation_id": conversation.id, "role": req.role}),
        )
        .await;
    Ok(Json(conversation))
}

/// GET /conversations/{id}/summary?prefer_llm=
async fn conversation_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> ApiResult<Json<SummaryResponse>> {
    let Query(q) = query?;
    let conversation = state.conversations.get(&id).await.ok_or_else(not_found)?;
    let summary = summarize(&conversation.messages, state.llm.as_ref(), q.prefer_llm).await;
    Ok(Json(SummaryResponse {
        conversation_id: conversation.id,
        summary: summary.summary,
        method: summary.method,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", post(create_conversation).get(list_conversations))
        .route("/conversations/search", get(search_conversations))
        .route("/conversations/stats", get(conversation_stats))
        .route("/conversations/{id}", get(get_conversation))
        .route("/conversations/{id}/message", post(append_message))
        .route("/conversations/{id}/summary", get(conversation_summary))
}
