//! REST endpoints for the user profile.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::get;
use axum::{Json, Router};

use super::model::{Profile, ProfilePatch};
use crate::app::AppState;
use crate::error::ApiResult;

/// GET /profile
async fn get_profile(State(state): State<AppState>) -> Json<Profile> {
    Json(state.profile.get().await)
}

/// PATCH /profile
async fn patch_profile(
    State(state): State<AppState>,
    body: Result<Json<ProfilePatch>, JsonRejection>,
) -> ApiResult<Json<Profile>> {
    let Json(patch) = body?;
    Ok(Json(state.profile.update(patch).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).patch(patch_profile))
}
