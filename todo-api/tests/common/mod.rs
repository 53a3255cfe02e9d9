//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store and provides helpers for
//! issuing requests with or without a bearer token.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use todo_api::app::{build_router, AppState};
use todo_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, LogFormat, StoreBackend};
use todo_shared::auth::jwt::{create_token, Claims};
use todo_shared::store::MemoryTodoStore;
use tower::Service as _;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the router and a caller identity
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryTodoStore>,
    pub user_id: i64,
    pub jwt_token: String,
}

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        store: StoreBackend::Memory,
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
            auto_migrate: false,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        log_format: LogFormat::Pretty,
    }
}

pub fn token_for(user_id: i64) -> String {
    create_token(&Claims::new(user_id), JWT_SECRET).unwrap()
}

impl TestContext {
    /// Fresh router and empty store, calling as user 1
    pub fn new() -> Self {
        Self::with_user(1)
    }

    pub fn with_user(user_id: i64) -> Self {
        let store = Arc::new(MemoryTodoStore::new());
        let app = build_router(AppState::new(store.clone(), test_config()));

        Self {
            app,
            store,
            user_id,
            jwt_token: token_for(user_id),
        }
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a request as the context's user
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        self.send_with_auth(method, uri, body, Some(&self.auth_header()))
            .await
    }

    /// Sends a request without credentials
    pub async fn send_anonymous(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        self.send_with_auth(method, uri, body, None).await
    }

    pub async fn send_with_auth(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    /// Creates a todo through the API and returns its id
    pub async fn create_todo(&self, task: &str) -> i64 {
        let response = self
            .send("POST", "/api/", Some(serde_json::json!({ "task": task })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_i64().unwrap()
    }
}
