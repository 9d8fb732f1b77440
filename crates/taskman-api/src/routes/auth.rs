//! Registration and login routes

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use taskman_core::{RegisterInput, ServiceError};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{ApiResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    debug!("Registering user: {}", request.username);

    let user = state
        .auth
        .register(RegisterInput {
            username: request.username,
            email: request.email,
            password: request.password,
            full_name: request.full_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User registered successfully",
            RegisterResponse {
                user_id: user.id,
                user,
            },
        )),
    ))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let outcome = match state.auth.login(&request.username, &request.password).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if matches!(e, ServiceError::InvalidCredentials) {
                metrics::counter!("taskman_logins_total", "outcome" => "failure").increment(1);
            }
            return Err(e.into());
        }
    };

    metrics::counter!("taskman_logins_total", "outcome" => "success").increment(1);

    Ok(Json(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token: outcome.token,
            expires_in: outcome.expires_in,
            user: outcome.user,
        },
    )))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
}
