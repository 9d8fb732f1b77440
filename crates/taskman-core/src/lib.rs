//! Taskman Core Business Logic
//!
//! This crate provides the registration/login flow and the
//! ownership-scoped todo operations. Services receive their stores as
//! trait objects at construction.

pub mod auth;
pub mod error;
pub mod todos;
pub mod validation;

pub use auth::{AuthService, LoginOutcome, RegisterInput};
pub use error::ServiceError;
pub use todos::{CreateTodo, TodoService};
