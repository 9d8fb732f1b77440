//! Subtask operations
//!
//! Subtasks have no owner column of their own; every statement joins
//! through the parent todo's `user_id`.

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Subtask, SubtaskUpdate};

use super::Database;

impl Database {
    /// Add a subtask to a todo owned by `user_id`.
    ///
    /// Returns `None` when the todo does not exist or belongs to someone else.
    pub async fn insert_owned_subtask(
        &self,
        todo_id: i64,
        user_id: i64,
        title: &str,
    ) -> Result<Option<Subtask>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO subtasks (todo_id, title, is_completed, completed_at, created_at, updated_at)
            SELECT id, ?, 0, NULL, ?, ?
            FROM todos
            WHERE id = ? AND user_id = ?
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.map(|row| Subtask {
            id: row.get("id"),
            todo_id,
            title: title.to_string(),
            is_completed: false,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }))
    }

    /// Get a subtask through its owned parent todo
    pub async fn get_owned_subtask(
        &self,
        id: i64,
        todo_id: i64,
        user_id: i64,
    ) -> Result<Option<Subtask>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT s.id, s.todo_id, s.title, s.is_completed, s.completed_at, s.created_at, s.updated_at
            FROM subtasks s
            JOIN todos t ON t.id = s.todo_id
            WHERE s.id = ? AND s.todo_id = ? AND t.user_id = ?
            "#,
        )
        .bind(id)
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Subtask::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List the subtasks of one todo in creation order
    pub(crate) async fn list_subtasks_for_todo(&self, todo_id: i64) -> Result<Vec<Subtask>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, todo_id, title, is_completed, completed_at, created_at, updated_at
            FROM subtasks
            WHERE todo_id = ?
            ORDER BY id
            "#,
        )
        .bind(todo_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Subtask::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update to a subtask whose todo is owned by `user_id`.
    ///
    /// Completing an open subtask stamps `completed_at`; reopening clears it.
    pub async fn update_owned_subtask(
        &self,
        id: i64,
        todo_id: i64,
        user_id: i64,
        update: SubtaskUpdate,
    ) -> Result<Option<Subtask>, DbError> {
        let now = Utc::now();
        let mut assignments = vec!["updated_at = ?"];
        let mut params: Vec<Option<String>> = vec![Some(now.to_rfc3339())];

        if let Some(title) = update.title {
            assignments.push("title = ?");
            params.push(Some(title));
        }
        let completed = update.is_completed;
        match completed {
            // Re-completing keeps the original stamp
            Some(true) => {
                assignments
                    .push("completed_at = CASE WHEN is_completed = 0 THEN ? ELSE completed_at END");
                params.push(Some(now.to_rfc3339()));
            }
            Some(false) => {
                assignments.push("completed_at = ?");
                params.push(None);
            }
            None => {}
        }

        let sql = format!(
            r#"
            UPDATE subtasks SET {}{}
            WHERE id = ? AND todo_id = ?
              AND todo_id IN (SELECT id FROM todos WHERE id = ? AND user_id = ?)
            "#,
            assignments.join(", "),
            if completed.is_some() { ", is_completed = ?" } else { "" }
        );

        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(param);
        }
        if let Some(done) = completed {
            query = query.bind(done);
        }
        let result = query
            .bind(id)
            .bind(todo_id)
            .bind(todo_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_owned_subtask(id, todo_id, user_id).await
    }

    /// Delete a subtask whose todo is owned by `user_id`
    pub async fn delete_owned_subtask(
        &self,
        id: i64,
        todo_id: i64,
        user_id: i64,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            DELETE FROM subtasks
            WHERE id = ? AND todo_id = ?
              AND todo_id IN (SELECT id FROM todos WHERE id = ? AND user_id = ?)
            "#,
        )
        .bind(id)
        .bind(todo_id)
        .bind(todo_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, NewTodo, NewUser, Priority};
    use chrono::DateTime;

    async fn setup() -> (Database, i64, i64, i64) {
        let db = Database::in_memory().await.unwrap();
        let alice = db
            .insert_user(NewUser {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password_hash: "hash".to_string(),
                full_name: String::new(),
            })
            .await
            .unwrap();
        let bob = db
            .insert_user(NewUser {
                username: "bob".to_string(),
                email: "bob@x.com".to_string(),
                password_hash: "hash".to_string(),
                full_name: String::new(),
            })
            .await
            .unwrap();
        let todo = db
            .insert_todo(NewTodo {
                user_id: alice.id,
                title: "Move house".to_string(),
                description: String::new(),
                priority: Priority::High,
                category: Category::Personal,
                due_date: None,
            })
            .await
            .unwrap();
        (db, alice.id, bob.id, todo.id)
    }

    #[tokio::test]
    async fn test_subtask_lifecycle() {
        let (db, alice, _, todo_id) = setup().await;

        let subtask = db
            .insert_owned_subtask(todo_id, alice, "Pack boxes")
            .await
            .unwrap()
            .unwrap();
        assert!(!subtask.is_completed);

        let done = db
            .update_owned_subtask(
                subtask.id,
                todo_id,
                alice,
                SubtaskUpdate {
                    is_completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(done.is_completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.title, "Pack boxes");

        let reopened = db
            .update_owned_subtask(
                subtask.id,
                todo_id,
                alice,
                SubtaskUpdate {
                    is_completed: Some(false),
                    title: Some("Pack more boxes".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!reopened.is_completed);
        assert!(reopened.completed_at.is_none());
        assert_eq!(reopened.title, "Pack more boxes");

        let todo = db.get_owned_todo(todo_id, alice).await.unwrap().unwrap();
        assert_eq!(todo.subtasks.len(), 1);

        assert!(db.delete_owned_subtask(subtask.id, todo_id, alice).await.unwrap());
        assert!(!db.delete_owned_subtask(subtask.id, todo_id, alice).await.unwrap());
    }

    #[tokio::test]
    async fn test_recompleting_keeps_completed_at() {
        let (db, alice, _, todo_id) = setup().await;
        let subtask = db
            .insert_owned_subtask(todo_id, alice, "Book van")
            .await
            .unwrap()
            .unwrap();
        let complete = || SubtaskUpdate {
            is_completed: Some(true),
            ..Default::default()
        };

        db.update_owned_subtask(subtask.id, todo_id, alice, complete())
            .await
            .unwrap()
            .unwrap();

        let stamp = "2020-01-01T00:00:00+00:00";
        sqlx::query("UPDATE subtasks SET completed_at = ? WHERE id = ?")
            .bind(stamp)
            .bind(subtask.id)
            .execute(db.pool())
            .await
            .unwrap();

        let again = db
            .update_owned_subtask(subtask.id, todo_id, alice, complete())
            .await
            .unwrap()
            .unwrap();
        assert!(again.is_completed);
        assert_eq!(
            again.completed_at,
            Some(DateTime::parse_from_rfc3339(stamp).unwrap().with_timezone(&Utc))
        );
    }

    #[tokio::test]
    async fn test_subtasks_are_scoped_through_todo_owner() {
        let (db, alice, bob, todo_id) = setup().await;

        assert!(db.insert_owned_subtask(todo_id, bob, "intrude").await.unwrap().is_none());

        let subtask = db
            .insert_owned_subtask(todo_id, alice, "Call movers")
            .await
            .unwrap()
            .unwrap();

        assert!(db.get_owned_subtask(subtask.id, todo_id, bob).await.unwrap().is_none());
        assert!(
            db.update_owned_subtask(subtask.id, todo_id, bob, SubtaskUpdate::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!db.delete_owned_subtask(subtask.id, todo_id, bob).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleting_todo_cascades_to_subtasks() {
        let (db, alice, _, todo_id) = setup().await;
        let subtask = db
            .insert_owned_subtask(todo_id, alice, "Label boxes")
            .await
            .unwrap()
            .unwrap();

        assert!(db.delete_owned_todo(todo_id, alice).await.unwrap());

        let remaining: i64 = sqlx::query("SELECT COUNT(*) AS count FROM subtasks WHERE id = ?")
            .bind(subtask.id)
            .fetch_one(db.pool())
            .await
            .unwrap()
            .get("count");
        assert_eq!(remaining, 0);
    }
}
