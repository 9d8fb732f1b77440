//! Taskman REST API
//!
//! This crate provides the Axum-based HTTP API for Taskman: public
//! registration and login, and the todo routes behind the auth gate.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{cors_layer, create_router};
pub use state::{AppState, MetricsHandle};
