//! Caller profile

use axum::{Json, Router, extract::State, routing::get};
use taskman_auth::CurrentUser;
use taskman_db::User;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::ApiResponse;

/// GET /api/v1/profile
async fn profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.auth.profile(user.id).await?;
    Ok(Json(ApiResponse::success("Profile retrieved", user)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/profile", get(profile))
}
