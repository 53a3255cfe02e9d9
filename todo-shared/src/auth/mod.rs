//! Authentication
//!
//! - [`jwt`]: HS256 token creation and validation
//! - [`middleware`]: bearer-token principal extraction for Axum

pub mod jwt;
pub mod middleware;
