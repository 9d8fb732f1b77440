//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Unexpected signing method: {0}")]
    UnexpectedSigningMethod(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Request is not authenticated")]
    Unauthenticated,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    #[error("Token signing error: {0}")]
    Signing(String),
}

impl AuthError {
    /// Whether this error rejects a request at the auth gate.
    ///
    /// All of these collapse to one indistinguishable 401 response.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::UnexpectedSigningMethod(_)
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::MissingAuthHeader
                | AuthError::InvalidAuthHeader
                | AuthError::Unauthenticated
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            e if e.is_rejection() => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        let body = axum::Json(json!({
            "status": "error",
            "message": message
        }));

        (status, body).into_response()
    }
}
