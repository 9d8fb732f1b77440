//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taskman_auth::AuthError;
use taskman_core::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::routes::types::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Service(e) => match e {
                ServiceError::InvalidCredentials => (StatusCode::UNAUTHORIZED, e.to_string()),
                ServiceError::DuplicateUsername | ServiceError::DuplicateEmail => {
                    (StatusCode::CONFLICT, e.to_string())
                }
                ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ServiceError::Auth(auth) => auth_status(auth),
                ServiceError::Database(_) | ServiceError::Internal(_) => internal(),
            },
            ApiError::Auth(e) => auth_status(e),
        }
    }
}

fn auth_status(e: &AuthError) -> (StatusCode, String) {
    match e {
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, e.to_string()),
        e if e.is_rejection() => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        _ => internal(),
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, axum::Json(ApiResponse::<()>::error(message))).into_response()
    }
}
