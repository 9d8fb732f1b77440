//! Taskman Authentication and Authorization
//!
//! This crate provides Argon2 password hashing, HMAC-signed JWT bearer
//! tokens, and the axum middleware that gates protected routes.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, TokenService};
pub use middleware::{AuthUser, CurrentUser, auth_middleware, authenticate};
pub use password::{hash_password, verify_password};
