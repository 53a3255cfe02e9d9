/// Todo model
///
/// A todo is a single task item owned by a user. Rows are created, changed
/// and removed through a [`TodoStore`](crate::store::TodoStore); this module
/// only defines the record and the inputs the store accepts.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id BIGSERIAL PRIMARY KEY,
///     task VARCHAR(255) NOT NULL,
///     complete BOOLEAN NOT NULL DEFAULT FALSE,
///     "timestamp" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     "update" TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of `task`, matching the column width.
pub const TASK_MAX_LENGTH: u64 = 255;

/// A stored todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Store-assigned id, never reused
    pub id: i64,

    /// Description of the work item
    pub task: String,

    /// Whether the item is done
    pub complete: bool,

    /// Creation time, fixed at insert
    pub timestamp: DateTime<Utc>,

    /// Last modification time
    pub update: DateTime<Utc>,

    /// Owning user id
    #[sqlx(rename = "user_id")]
    pub user: i64,
}

/// Input for creating a todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub complete: bool,
    pub user: i64,
}

/// Partial update of a todo.
///
/// `None` leaves the stored value untouched. `user` is always written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub task: Option<String>,
    pub complete: Option<bool>,
    pub user: i64,
}

impl TodoChanges {
    /// Applies the changes to an in-memory copy, refreshing `update`.
    ///
    /// `update` never moves backwards, even if the clock does.
    pub fn apply(self, todo: &mut Todo, now: DateTime<Utc>) {
        if let Some(task) = self.task {
            todo.task = task;
        }
        if let Some(complete) = self.complete {
            todo.complete = complete;
        }
        todo.user = self.user;
        todo.update = todo.update.max(now);
    }
}
