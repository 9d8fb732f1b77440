//! Store traits consumed by the service layer

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{
    NewTodo, NewUser, Subtask, SubtaskUpdate, Todo, TodoFilter, TodoUpdate, User,
};
use crate::repository::Database;

/// Credential store
///
/// Lookups only match active users. `create` reports a username or email
/// conflict as [`DbError::Duplicate`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError>;

    async fn create(&self, user: NewUser) -> Result<User, DbError>;
}

/// Todo store
///
/// Every method that touches an existing todo takes the caller's id and
/// must scope the lookup by it in the same query.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn find_owned(&self, todo_id: i64, owner_id: i64) -> Result<Option<Todo>, DbError>;

    /// Unscoped lookup by share identifier
    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Todo>, DbError>;

    async fn list_owned(&self, owner_id: i64, filter: &TodoFilter) -> Result<Vec<Todo>, DbError>;

    async fn create(&self, todo: NewTodo) -> Result<Todo, DbError>;

    async fn update_owned(
        &self,
        todo_id: i64,
        owner_id: i64,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, DbError>;

    async fn delete_owned(&self, todo_id: i64, owner_id: i64) -> Result<bool, DbError>;

    async fn add_subtask(
        &self,
        todo_id: i64,
        owner_id: i64,
        title: &str,
    ) -> Result<Option<Subtask>, DbError>;

    async fn update_subtask_owned(
        &self,
        subtask_id: i64,
        todo_id: i64,
        owner_id: i64,
        update: SubtaskUpdate,
    ) -> Result<Option<Subtask>, DbError>;

    async fn delete_subtask_owned(
        &self,
        subtask_id: i64,
        todo_id: i64,
        owner_id: i64,
    ) -> Result<bool, DbError>;
}

#[async_trait]
impl UserStore for Database {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_username(username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_email(email).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.get_user_by_id(id).await
    }

    async fn create(&self, user: NewUser) -> Result<User, DbError> {
        self.insert_user(user).await
    }
}

#[async_trait]
impl TodoStore for Database {
    async fn find_owned(&self, todo_id: i64, owner_id: i64) -> Result<Option<Todo>, DbError> {
        self.get_owned_todo(todo_id, owner_id).await
    }

    async fn find_by_public_id(&self, public_id: &str) -> Result<Option<Todo>, DbError> {
        self.get_todo_by_public_id(public_id).await
    }

    async fn list_owned(&self, owner_id: i64, filter: &TodoFilter) -> Result<Vec<Todo>, DbError> {
        self.list_owned_todos(owner_id, filter).await
    }

    async fn create(&self, todo: NewTodo) -> Result<Todo, DbError> {
        self.insert_todo(todo).await
    }

    async fn update_owned(
        &self,
        todo_id: i64,
        owner_id: i64,
        update: TodoUpdate,
    ) -> Result<Option<Todo>, DbError> {
        self.update_owned_todo(todo_id, owner_id, update).await
    }

    async fn delete_owned(&self, todo_id: i64, owner_id: i64) -> Result<bool, DbError> {
        self.delete_owned_todo(todo_id, owner_id).await
    }

    async fn add_subtask(
        &self,
        todo_id: i64,
        owner_id: i64,
        title: &str,
    ) -> Result<Option<Subtask>, DbError> {
        self.insert_owned_subtask(todo_id, owner_id, title).await
    }

    async fn update_subtask_owned(
        &self,
        subtask_id: i64,
        todo_id: i64,
        owner_id: i64,
        update: SubtaskUpdate,
    ) -> Result<Option<Subtask>, DbError> {
        self.update_owned_subtask(subtask_id, todo_id, owner_id, update)
            .await
    }

    async fn delete_subtask_owned(
        &self,
        subtask_id: i64,
        todo_id: i64,
        owner_id: i64,
    ) -> Result<bool, DbError> {
        self.delete_owned_subtask(subtask_id, todo_id, owner_id).await
    }
}
