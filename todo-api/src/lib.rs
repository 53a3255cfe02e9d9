//! # Todo API Server Library
//!
//! HTTP surface for the todo resource.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration management
//! - `error`: error handling and HTTP response mapping
//! - `middleware`: response middleware
//! - `routes`: route handlers
//! - `schema`: request body validation

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod schema;
