use super::{StoreResult, TodoStore};
use crate::models::todo::{NewTodo, Todo, TodoChanges};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct State {
    next_id: i64,
    todos: BTreeMap<i64, Todo>,
}

/// In-process todo store.
///
/// Ids start at 1 and are never reused, matching a database sequence.
/// Owner ids are not checked against a user table.
#[derive(Debug)]
pub struct MemoryTodoStore {
    state: RwLock<State>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                todos: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_all(&self) -> StoreResult<Vec<Todo>> {
        let state = self.state.read().await;
        Ok(state.todos.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Todo>> {
        let state = self.state.read().await;
        Ok(state.todos.get(&id).cloned())
    }

    async fn create(&self, data: NewTodo) -> StoreResult<Todo> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let now = Utc::now();
        let todo = Todo {
            id,
            task: data.task,
            complete: data.complete,
            timestamp: now,
            update: now,
            user: data.user,
        };
        state.todos.insert(id, todo.clone());

        Ok(todo)
    }

    async fn update(&self, id: i64, changes: TodoChanges) -> StoreResult<Option<Todo>> {
        let mut state = self.state.write().await;
        let Some(todo) = state.todos.get_mut(&id) else {
            return Ok(None);
        };

        changes.apply(todo, Utc::now());
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.todos.remove(&id).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}
