//! API route handlers
//!
//! - `health`: health check endpoint
//! - `todos`: the todo collection and item endpoints

pub mod health;
pub mod todos;
