//! Data models
//!
//! - `todo`: the todo record and the inputs for creating/changing it
//! - `user`: owners of todos

pub mod todo;
pub mod user;
