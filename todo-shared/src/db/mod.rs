//! Database layer
//!
//! - `pool`: PostgreSQL connection pool lifecycle and health checks
//! - `migrations`: embedded schema migrations
//!
//! Models live in the `models` module; the store port that handlers use is
//! in `store`.

pub mod migrations;
pub mod pool;
