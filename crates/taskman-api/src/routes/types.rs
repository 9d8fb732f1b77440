//! Request/Response DTOs

use chrono::{DateTime, Utc};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize};
use taskman_db::{Category, Priority, Status, SubtaskUpdate, TodoFilter, TodoUpdate, User};

// ==================== Envelope ====================

/// Response envelope shared by every JSON endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ==================== Auth Types ====================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub user: User,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

// ==================== Todo Types ====================

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial todo update
///
/// An absent field is left alone; `"due_date": null` clears the due date.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl From<UpdateTodoRequest> for TodoUpdate {
    fn from(req: UpdateTodoRequest) -> Self {
        TodoUpdate {
            title: req.title,
            description: req.description,
            priority: req.priority,
            category: req.category,
            status: req.status,
            due_date: req.due_date,
        }
    }
}

/// Query string for listing todos
///
/// An empty value (`?status=`) means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<Category>,
}

impl From<ListTodosQuery> for TodoFilter {
    fn from(query: ListTodosQuery) -> Self {
        TodoFilter {
            status: query.status,
            category: query.category,
        }
    }
}

// ==================== Subtask Types ====================

#[derive(Debug, Deserialize)]
pub struct CreateSubtaskRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubtaskRequest {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl From<UpdateSubtaskRequest> for SubtaskUpdate {
    fn from(req: UpdateSubtaskRequest) -> Self {
        SubtaskUpdate {
            title: req.title,
            is_completed: req.is_completed,
        }
    }
}

/// Distinguishes an explicit `null` from an absent field
fn present_or_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Treats a blank string as an absent value
fn empty_as_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => T::deserialize(value.into_deserializer()).map(Some),
        _ => Ok(None),
    }
}
