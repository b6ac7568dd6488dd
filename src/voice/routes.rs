//! REST endpoints for voice.

use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::engine::{Synthesis, Transcription, synthesize_speech, transcribe_audio};
use crate::app::AppState;
use crate::error::{ApiResult, require_len};

#[derive(Debug, Deserialize)]
pub struct TranscribeRequest {
    pub audio_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
}

/// POST /voice/transcribe
async fn transcribe(
    body: Result<Json<TranscribeRequest>, JsonRejection>,
) -> ApiResult<Json<Transcription>> {
    let Json(req) = body?;
    require_len("audio_base64", &req.audio_base64, 1)?;
    Ok(Json(transcribe_audio(&req.audio_base64)))
}

/// POST /voice/synthesize
async fn synthesize(
    body: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> ApiResult<Json<Synthesis>> {
    let Json(req) = body?;
    require_len("text", &req.text, 1)?;
    Ok(Json(synthesize_speech(&req.text)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/voice/transcribe", post(transcribe))
        .route("/voice/synthesize", post(synthesize))
}
