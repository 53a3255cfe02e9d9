use super::{StoreError, StoreResult, TodoStore};
use crate::db::pool::{close_pool, health_check};
use crate::models::todo::{NewTodo, Todo, TodoChanges};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

const TODO_COLUMNS: &str = r#"id, task, complete, "timestamp", "update", user_id"#;

/// Todo store backed by the `todos` table.
///
/// Timestamps come from the database clock: `timestamp` and `update`
/// default to `NOW()` on insert and `update` is refreshed by every UPDATE.
#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps an FK violation on `user_id` to [`StoreError::UnknownUser`].
fn map_owner_error(err: sqlx::Error, user: i64) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return StoreError::UnknownUser(user);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl TodoStore for PgTodoStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_all(&self) -> StoreResult<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn create(&self, data: NewTodo) -> StoreResult<Todo> {
        let user = data.user;
        sqlx::query_as::<_, Todo>(&format!(
            r#"
            INSERT INTO todos (task, complete, user_id)
            VALUES ($1, $2, $3)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(data.task)
        .bind(data.complete)
        .bind(data.user)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_owner_error(e, user))
    }

    async fn update(&self, id: i64, changes: TodoChanges) -> StoreResult<Option<Todo>> {
        let user = changes.user;
        sqlx::query_as::<_, Todo>(&format!(
            r#"
            UPDATE todos
            SET task = COALESCE($2, task),
                complete = COALESCE($3, complete),
                user_id = $4,
                "update" = GREATEST(NOW(), "update")
            WHERE id = $1
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.task)
        .bind(changes.complete)
        .bind(changes.user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_owner_error(e, user))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        close_pool(self.pool.clone()).await;
    }
}
