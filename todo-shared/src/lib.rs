//! # Todo Shared Library
//!
//! Types and persistence used by the todo API server.
//!
//! ## Module Organization
//!
//! - `models`: the todo and user records
//! - `store`: the record store port and its PostgreSQL/in-memory adapters
//! - `db`: connection pool and migrations
//! - `auth`: bearer-token principal extraction

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
