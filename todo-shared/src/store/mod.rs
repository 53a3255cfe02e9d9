//! Todo record store
//!
//! Handlers talk to persistence through the [`TodoStore`] trait so the
//! backing engine can be swapped: [`PgTodoStore`] for production and
//! [`MemoryTodoStore`] for tests and database-less runs.
//!
//! # Contract
//!
//! - `create` assigns `id`, `timestamp` and `update`
//! - `update` writes only the fields present in [`TodoChanges`], always
//!   writes `user`, and refreshes `update`
//! - `get`/`update` return `None` and `delete` returns `false` for an
//!   unknown id
//! - deletion is physical
//!
//! # Example
//!
//! ```
//! use todo_shared::models::todo::NewTodo;
//! use todo_shared::store::{MemoryTodoStore, TodoStore};
//!
//! # async fn example() -> Result<(), todo_shared::store::StoreError> {
//! let store = MemoryTodoStore::new();
//! let todo = store.create(NewTodo {
//!     task: "buy milk".to_string(),
//!     complete: false,
//!     user: 1,
//! }).await?;
//!
//! assert!(store.delete(todo.id).await?);
//! assert!(store.get(todo.id).await?.is_none());
//! # Ok(())
//! # }
//! ```

mod memory;
mod postgres;

pub use memory::MemoryTodoStore;
pub use postgres::PgTodoStore;

use crate::models::todo::{NewTodo, Todo, TodoChanges};
use async_trait::async_trait;

/// Errors raised by a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The owner reference does not point at an existing user
    #[error("User {0} does not exist")]
    UnknownUser(i64),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence port for todos
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Short backend name for logs and the health report
    fn backend(&self) -> &'static str;

    /// Every stored todo, ordered by id
    async fn list_all(&self) -> StoreResult<Vec<Todo>>;

    /// The todo with `id`, if any
    async fn get(&self, id: i64) -> StoreResult<Option<Todo>>;

    /// Persists a new todo
    async fn create(&self, data: NewTodo) -> StoreResult<Todo>;

    /// Applies a partial update; `None` if `id` is unknown
    async fn update(&self, id: i64, changes: TodoChanges) -> StoreResult<Option<Todo>>;

    /// Removes the todo; `false` if `id` is unknown
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Releases backend resources. Called once at shutdown.
    async fn close(&self);
}
