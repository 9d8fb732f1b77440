//! Todo routes
//!
//! All handlers run behind the auth gate and act only on the caller's own
//! todos. Another user's todo id answers 404, never 403.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use taskman_auth::CurrentUser;
use taskman_core::CreateTodo;
use taskman_db::Todo;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{ApiResponse, CreateTodoRequest, ListTodosQuery, UpdateTodoRequest};

/// POST /api/v1/todos
async fn create_todo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Todo>>), ApiError> {
    let todo = state
        .todos
        .create(
            user.id,
            CreateTodo {
                title: request.title,
                description: request.description,
                priority: request.priority,
                category: request.category,
                due_date: request.due_date,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Todo created successfully", todo)),
    ))
}

/// GET /api/v1/todos
async fn list_todos(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<ApiResponse<Vec<Todo>>>, ApiError> {
    debug!("Listing todos for user {}: {:?}", user.id, query);

    let todos = state.todos.list(user.id, &query.into()).await?;
    Ok(Json(ApiResponse::success("Todos retrieved successfully", todos)))
}

/// GET /api/v1/todos/{id}
async fn get_todo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = state.todos.get(user.id, id).await?;
    Ok(Json(ApiResponse::success("Todo retrieved successfully", todo)))
}

/// PUT /api/v1/todos/{id}
async fn update_todo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTodoRequest>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    let todo = state.todos.update(user.id, id, request.into()).await?;
    Ok(Json(ApiResponse::success("Todo updated successfully", todo)))
}

/// DELETE /api/v1/todos/{id}
async fn delete_todo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.todos.delete(user.id, id).await?;
    Ok(Json(ApiResponse::message("Todo deleted successfully")))
}

/// GET /api/v1/todos/public/{public_id}
///
/// Unscoped lookup by the todo's random share identifier.
async fn get_public_todo(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<ApiResponse<Todo>>, ApiError> {
    if public_id.len() > 64 {
        return Err(ApiError::BadRequest("Invalid public id".to_string()));
    }
    let todo = state.todos.get_public(&public_id).await?;
    Ok(Json(ApiResponse::success("Todo retrieved successfully", todo)))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/todos", get(list_todos).post(create_todo))
        .route(
            "/api/v1/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/v1/todos/public/{public_id}", get(get_public_todo))
}
