//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

impl DbError {
    /// Classify an insert failure, surfacing unique-constraint
    /// violations as [`DbError::Duplicate`] carrying the column message
    /// (e.g. `UNIQUE constraint failed: users.email`).
    pub fn from_insert(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(db_err.message().to_string())
            }
            other => DbError::Connection(other),
        }
    }
}
