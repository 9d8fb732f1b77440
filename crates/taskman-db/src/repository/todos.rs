//! Todo operations
//!
//! Every read and write that acts on an existing todo is scoped by
//! `(id, user_id)` inside a single statement. A todo owned by someone
//! else is indistinguishable from one that does not exist.

use chrono::Utc;
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewTodo, Subtask, Todo, TodoFilter, TodoUpdate};
use crate::repository::Database;

const TODO_COLUMNS: &str = "id, public_id, user_id, title, description, priority, category, status, due_date, created_at, updated_at";

impl Database {
    // ==================== Todo Operations ====================

    /// Insert a new todo with status `todo` and a fresh public id
    pub async fn insert_todo(&self, todo: NewTodo) -> Result<Todo, DbError> {
        let now = Utc::now();
        let public_id = Uuid::new_v4().to_string();
        let status = crate::models::Status::default();

        let result = sqlx::query(
            r#"
            INSERT INTO todos (public_id, user_id, title, description, priority, category, status, due_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&public_id)
        .bind(todo.user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.priority.as_str())
        .bind(todo.category.as_str())
        .bind(status.as_str())
        .bind(todo.due_date.map(|d| d.to_rfc3339()))
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from_insert)?;

        let id: i64 = result.get("id");

        Ok(Todo {
            id,
            public_id,
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            priority: todo.priority,
            category: todo.category,
            status,
            due_date: todo.due_date,
            created_at: now,
            updated_at: now,
            subtasks: Vec::new(),
        })
    }

    /// Get a todo owned by `user_id`, with its subtasks
    pub async fn get_owned_todo(&self, id: i64, user_id: i64) -> Result<Option<Todo>, DbError> {
        let sql = format!("SELECT {} FROM todos WHERE id = ? AND user_id = ?", TODO_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match result {
            Some(row) => {
                let mut todo = Todo::try_from(&row)?;
                todo.subtasks = self.list_subtasks_for_todo(todo.id).await?;
                Ok(Some(todo))
            }
            None => Ok(None),
        }
    }

    /// Get a todo by its public id, regardless of owner
    pub async fn get_todo_by_public_id(&self, public_id: &str) -> Result<Option<Todo>, DbError> {
        let sql = format!("SELECT {} FROM todos WHERE public_id = ?", TODO_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;

        match result {
            Some(row) => {
                let mut todo = Todo::try_from(&row)?;
                todo.subtasks = self.list_subtasks_for_todo(todo.id).await?;
                Ok(Some(todo))
            }
            None => Ok(None),
        }
    }

    /// List a user's todos, newest first, with optional filters
    pub async fn list_owned_todos(
        &self,
        user_id: i64,
        filter: &TodoFilter,
    ) -> Result<Vec<Todo>, DbError> {
        let mut conditions = vec!["user_id = ?"];
        let mut params: Vec<&'static str> = Vec::new();

        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(status.as_str());
        }
        if let Some(category) = filter.category {
            conditions.push("category = ?");
            params.push(category.as_str());
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM todos
            WHERE {}
            ORDER BY created_at DESC, id DESC
            "#,
            TODO_COLUMNS,
            conditions.join(" AND ")
        );

        let mut query = sqlx::query(&sql).bind(user_id);
        for param in &params {
            query = query.bind(*param);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut todos: Vec<Todo> = rows
            .iter()
            .map(|row| Todo::try_from(row).map_err(DbError::from))
            .collect::<Result<_, _>>()?;

        let mut subtasks = self.subtasks_by_owner(user_id).await?;
        for todo in &mut todos {
            todo.subtasks = subtasks.remove(&todo.id).unwrap_or_default();
        }

        Ok(todos)
    }

    /// Apply a partial update to a todo owned by `user_id`.
    ///
    /// Returns `None` when no todo matches `(id, user_id)`.
    pub async fn update_owned_todo(
        &self,
        id: i64,
        user_id: i64,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, DbError> {
        let now = Utc::now();
        let mut assignments = vec!["updated_at = ?"];
        let mut params: Vec<Option<String>> = vec![Some(now.to_rfc3339())];

        if let Some(title) = update.title {
            assignments.push("title = ?");
            params.push(Some(title));
        }
        if let Some(description) = update.description {
            assignments.push("description = ?");
            params.push(Some(description));
        }
        if let Some(priority) = update.priority {
            assignments.push("priority = ?");
            params.push(Some(priority.as_str().to_string()));
        }
        if let Some(category) = update.category {
            assignments.push("category = ?");
            params.push(Some(category.as_str().to_string()));
        }
        if let Some(status) = update.status {
            assignments.push("status = ?");
            params.push(Some(status.as_str().to_string()));
        }
        if let Some(due_date) = update.due_date {
            assignments.push("due_date = ?");
            params.push(due_date.map(|d| d.to_rfc3339()));
        }

        let sql = format!(
            "UPDATE todos SET {} WHERE id = ? AND user_id = ?",
            assignments.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        let result = query.bind(id).bind(user_id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_owned_todo(id, user_id).await
    }

    /// Delete a todo owned by `user_id` (subtasks cascade)
    pub async fn delete_owned_todo(&self, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All subtasks of all todos owned by `user_id`, grouped by todo
    async fn subtasks_by_owner(&self, user_id: i64) -> Result<HashMap<i64, Vec<Subtask>>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.todo_id, s.title, s.is_completed, s.completed_at, s.created_at, s.updated_at
            FROM subtasks s
            JOIN todos t ON t.id = s.todo_id
            WHERE t.user_id = ?
            ORDER BY s.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Subtask>> = HashMap::new();
        for row in &rows {
            let subtask = Subtask::try_from(row)?;
            grouped.entry(subtask.todo_id).or_default().push(subtask);
        }
        Ok(grouped)
    }
}
