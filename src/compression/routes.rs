//! REST endpoints for text compression.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::compressor::{CompressionResult, ConversationCompression};
use crate::app::AppState;
use crate::error::{ApiResult, require_len};

#[derive(Debug, Deserialize)]
pub struct CompressRequest {
    pub text: String,
}

/// POST /utils/compress
async fn compress(
    State(state): State<AppState>,
    body: Result<Json<CompressRequest>, JsonRejection>,
) -> ApiResult<Json<CompressionResult>> {
    let Json(req) = body?;
    require_len("text", &req.text, 1)?;
    Ok(Json(state.compressor.compress(&req.text).await?))
}

/// POST /compression/conversations
async fn compress_conversations(
    State(state): State<AppState>,
) -> ApiResult<Json<ConversationCompression>> {
    let conversations = state.conversations.list().await;
    Ok(Json(state.compressor.compress_conversations(&conversations).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/utils/compress", post(compress))
        .route("/compression/conversations", post(compress_conversations))
}
