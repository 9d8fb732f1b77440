//! Ownership-scoped todo operations
//!
//! Every operation on an existing todo is scoped by the caller's id. A
//! todo owned by someone else is reported exactly like one that does not
//! exist, so callers cannot probe for other users' ids.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use taskman_db::{
    Category, NewTodo, Priority, Subtask, SubtaskUpdate, Todo, TodoFilter, TodoStore, TodoUpdate,
};
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::validation::{validate_description, validate_title};

/// Input for creating a todo; unset enums take their defaults
#[derive(Debug, Clone, Default)]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoStore>) -> Self {
        Self { todos }
    }

    /// Create a todo owned by `owner_id`
    pub async fn create(&self, owner_id: i64, input: CreateTodo) -> Result<Todo, ServiceError> {
        let title = input.title.trim().to_string();
        validate_title(&title)?;
        validate_description(&input.description)?;

        let todo = self
            .todos
            .create(NewTodo {
                user_id: owner_id,
                title,
                description: input.description,
                priority: input.priority.unwrap_or_default(),
                category: input.category.unwrap_or_default(),
                due_date: input.due_date,
            })
            .await?;

        info!("User {} created todo {}", owner_id, todo.id);
        Ok(todo)
    }

    /// List the caller's todos, newest first
    pub async fn list(&self, owner_id: i64, filter: &TodoFilter) -> Result<Vec<Todo>, ServiceError> {
        Ok(self.todos.list_owned(owner_id, filter).await?)
    }

    pub async fn get(&self, owner_id: i64, todo_id: i64) -> Result<Todo, ServiceError> {
        self.todos
            .find_owned(todo_id, owner_id)
            .await?
            .ok_or(ServiceError::NotFound("Todo"))
    }

    /// Look up a todo by its share identifier, regardless of owner
    pub async fn get_public(&self, public_id: &str) -> Result<Todo, ServiceError> {
        self.todos
            .find_by_public_id(public_id)
            .await?
            .ok_or(ServiceError::NotFound("Todo"))
    }

    /// Apply a partial update; an empty update returns the todo unchanged
    pub async fn update(
        &self,
        owner_id: i64,
        todo_id: i64,
        mut update: TodoUpdate,
    ) -> Result<Todo, ServiceError> {
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
            validate_title(title)?;
        }
        if let Some(description) = update.description.as_deref() {
            validate_description(description)?;
        }

        if update.is_empty() {
            debug!("Empty update for todo {}", todo_id);
            return self.get(owner_id, todo_id).await;
        }

        self.todos
            .update_owned(todo_id, owner_id, update)
            .await?
            .ok_or(ServiceError::NotFound("Todo"))
    }

    /// Delete a todo along with its subtasks
    pub async fn delete(&self, owner_id: i64, todo_id: i64) -> Result<(), ServiceError> {
        if !self.todos.delete_owned(todo_id, owner_id).await? {
            return Err(ServiceError::NotFound("Todo"));
        }
        info!("User {} deleted todo {}", owner_id, todo_id);
        Ok(())
    }

    pub async fn add_subtask(
        &self,
        owner_id: i64,
        todo_id: i64,
        title: &str,
    ) -> Result<Subtask, ServiceError> {
        let title = title.trim();
        validate_title(title)?;

        self.todos
            .add_subtask(todo_id, owner_id, title)
            .await?
            .ok_or(ServiceError::NotFound("Todo"))
    }

    pub async fn update_subtask(
        &self,
        owner_id: i64,
        todo_id: i64,
        subtask_id: i64,
        mut update: SubtaskUpdate,
    ) -> Result<Subtask, ServiceError> {
        if let Some(title) = update.title.as_mut() {
            *title = title.trim().to_string();
            validate_title(title)?;
        }

        self.todos
            .update_subtask_owned(subtask_id, todo_id, owner_id, update)
            .await?
            .ok_or(ServiceError::NotFound("Subtask"))
    }

    pub async fn delete_subtask(
        &self,
        owner_id: i64,
        todo_id: i64,
        subtask_id: i64,
    ) -> Result<(), ServiceError> {
        if !self
            .todos
            .delete_subtask_owned(subtask_id, todo_id, owner_id)
            .await?
        {
            return Err(ServiceError::NotFound("Subtask"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskman_db::{Database, NewUser, Status};

    struct Fixture {
        todos: TodoService,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = db
                .insert_user(NewUser {
                    username: name.to_string(),
                    email: format!("{}@x.com", name),
                    password_hash: "hash".to_string(),
                    full_name: String::new(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        Fixture {
            todos: TodoService::new(db),
            alice: ids[0],
            bob: ids[1],
        }
    }

    fn titled(title: &str) -> CreateTodo {
        CreateTodo {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let f = fixture().await;
        let todo = f.todos.create(f.alice, titled("  Buy milk ")).await.unwrap();

        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.user_id, f.alice);
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.category, Category::Personal);
        assert_eq!(todo.status, Status::Todo);
        assert!(todo.subtasks.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let f = fixture().await;
        assert!(matches!(
            f.todos.create(f.alice, titled("   ")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_todo_is_not_found() {
        let f = fixture().await;
        let todo = f.todos.create(f.alice, titled("private")).await.unwrap();

        assert!(matches!(
            f.todos.get(f.bob, todo.id).await,
            Err(ServiceError::NotFound("Todo"))
        ));
        assert!(matches!(
            f.todos.get(f.bob, todo.id + 1000).await,
            Err(ServiceError::NotFound("Todo"))
        ));

        let update = TodoUpdate {
            title: Some("hijacked".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            f.todos.update(f.bob, todo.id, update).await,
            Err(ServiceError::NotFound("Todo"))
        ));
        assert!(matches!(
            f.todos.delete(f.bob, todo.id).await,
            Err(ServiceError::NotFound("Todo"))
        ));
        assert!(matches!(
            f.todos.add_subtask(f.bob, todo.id, "sneaky").await,
            Err(ServiceError::NotFound("Todo"))
        ));

        let unchanged = f.todos.get(f.alice, todo.id).await.unwrap();
        assert_eq!(unchanged.title, "private");
        assert!(unchanged.subtasks.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner() {
        let f = fixture().await;
        f.todos.create(f.alice, titled("a1")).await.unwrap();
        f.todos.create(f.alice, titled("a2")).await.unwrap();
        f.todos.create(f.bob, titled("b1")).await.unwrap();

        let alice_todos = f.todos.list(f.alice, &TodoFilter::default()).await.unwrap();
        assert_eq!(alice_todos.len(), 2);
        assert!(alice_todos.iter().all(|t| t.user_id == f.alice));

        let bob_todos = f.todos.list(f.bob, &TodoFilter::default()).await.unwrap();
        assert_eq!(bob_todos.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_empty_update() {
        let f = fixture().await;
        let todo = f.todos.create(f.alice, titled("draft")).await.unwrap();

        let updated = f
            .todos
            .update(
                f.alice,
                todo.id,
                TodoUpdate {
                    status: Some(Status::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, Status::Done);
        assert_eq!(updated.title, "draft");

        let same = f
            .todos
            .update(f.alice, todo.id, TodoUpdate::default())
            .await
            .unwrap();
        assert_eq!(same.status, Status::Done);
    }

    #[tokio::test]
    async fn test_delete_owned() {
        let f = fixture().await;
        let todo = f.todos.create(f.alice, titled("temp")).await.unwrap();

        f.todos.delete(f.alice, todo.id).await.unwrap();
        assert!(matches!(
            f.todos.get(f.alice, todo.id).await,
            Err(ServiceError::NotFound("Todo"))
        ));
    }

    #[tokio::test]
    async fn test_subtask_lifecycle_and_scoping() {
        let f = fixture().await;
        let todo = f.todos.create(f.alice, titled("parent")).await.unwrap();

        let subtask = f.todos.add_subtask(f.alice, todo.id, "step one").await.unwrap();
        assert!(!subtask.is_completed);

        let done = f
            .todos
            .update_subtask(
                f.alice,
                todo.id,
                subtask.id,
                SubtaskUpdate {
                    title: None,
                    is_completed: Some(true),
                },
            )
            .await
            .unwrap();
        assert!(done.is_completed);
        assert!(done.completed_at.is_some());

        assert!(matches!(
            f.todos
                .update_subtask(f.bob, todo.id, subtask.id, SubtaskUpdate::default())
                .await,
            Err(ServiceError::NotFound("Subtask"))
        ));
        assert!(matches!(
            f.todos.delete_subtask(f.bob, todo.id, subtask.id).await,
            Err(ServiceError::NotFound("Subtask"))
        ));

        f.todos
            .delete_subtask(f.alice, todo.id, subtask.id)
            .await
            .unwrap();
        assert!(f.todos.get(f.alice, todo.id).await.unwrap().subtasks.is_empty());
    }

    #[tokio::test]
    async fn test_public_lookup() {
        let f = fixture().await;
        let todo = f.todos.create(f.alice, titled("shared")).await.unwrap();

        let found = f.todos.get_public(&todo.public_id).await.unwrap();
        assert_eq!(found.id, todo.id);
        assert!(matches!(
            f.todos.get_public("does-not-exist").await,
            Err(ServiceError::NotFound("Todo"))
        ));
    }
}
