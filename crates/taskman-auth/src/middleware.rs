//! Authentication middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::{Claims, TokenService};

/// Authenticated user information, bound to a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
}

impl AuthUser {
    /// Create from JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self { id: claims.user_id }
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Resolve the caller's identity from a raw `Authorization` header value
pub fn authenticate(header: Option<&str>, tokens: &TokenService) -> Result<AuthUser, AuthError> {
    let header = header.ok_or(AuthError::MissingAuthHeader)?;
    let token = extract_bearer_token(header)?;
    let claims = tokens.validate(token)?;
    Ok(AuthUser::from_claims(&claims))
}

/// Authentication middleware
///
/// Every request must carry a valid `Bearer` token. On success the
/// [`AuthUser`] is added to the request extensions; otherwise the request
/// is answered with 401 and the inner handler never runs.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::InvalidAuthHeader))
        .transpose();

    let user = header
        .and_then(|header| authenticate(header, &tokens))
        .inspect_err(|e| {
            metrics::counter!("taskman_auth_rejections_total").increment(1);
            warn!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = %e,
                "Rejected unauthenticated request"
            );
        })?;

    debug!("Authenticated user id {}", user.id);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extractor for the identity resolved by [`auth_middleware`]
///
/// Fails with [`AuthError::Unauthenticated`] when used on a route the
/// middleware does not cover.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub AuthUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .map(CurrentUser)
            .ok_or(AuthError::Unauthenticated)
    }
}
