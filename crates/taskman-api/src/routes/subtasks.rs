//! Subtask routes, nested under an owned todo

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use taskman_auth::CurrentUser;
use taskman_db::Subtask;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{ApiResponse, CreateSubtaskRequest, UpdateSubtaskRequest};

/// POST /api/v1/todos/{id}/subtasks
async fn create_subtask(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(todo_id): Path<i64>,
    Json(request): Json<CreateSubtaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Subtask>>), ApiError> {
    let subtask = state
        .todos
        .add_subtask(user.id, todo_id, &request.title)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Subtask created successfully", subtask)),
    ))
}

/// PUT /api/v1/todos/{id}/subtasks/{subtask_id}
async fn update_subtask(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path((todo_id, subtask_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateSubtaskRequest>,
) -> Result<Json<ApiResponse<Subtask>>, ApiError> {
    let subtask = state
        .todos
        .update_subtask(user.id, todo_id, subtask_id, request.into())
        .await?;

    Ok(Json(ApiResponse::success(
        "Subtask updated successfully",
        subtask,
    )))
}

/// DELETE /api/v1/todos/{id}/subtasks/{subtask_id}
async fn delete_subtask(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path((todo_id, subtask_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .todos
        .delete_subtask(user.id, todo_id, subtask_id)
        .await?;

    Ok(Json(ApiResponse::message("Subtask deleted successfully")))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/todos/{id}/subtasks", post(create_subtask))
        .route(
            "/api/v1/todos/{id}/subtasks/{subtask_id}",
            put(update_subtask).delete(delete_subtask),
        )
}
