//! Taskman Database Layer
//!
//! This crate provides the persistence layer for Taskman, using SQLite
//! via sqlx. Services depend on the [`UserStore`] and [`TodoStore`]
//! traits; [`Database`] implements both.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
pub use store::{TodoStore, UserStore};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
