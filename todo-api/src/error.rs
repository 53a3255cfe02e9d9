/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every failure is an [`ApiError`] that
/// knows its HTTP status and body.
///
/// # Response bodies
///
/// - missing todo: `{"rest" | "res": "Object with todo id does not exists"}`
///   with status 400, keyed the way existing clients expect
/// - field validation: `{"task": ["This field is required."]}` with status 400
/// - everything else: `{"error": "<code>", "message": "<text>"}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use todo_shared::{auth::middleware::AuthError, store::StoreError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Per-field validation messages, keyed by field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Message reported when a todo id has no record
pub const TODO_MISSING_MESSAGE: &str = "Object with todo id does not exists";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// No todo with the requested id (400, body keyed by the given name)
    TodoMissing(&'static str),

    /// Request body failed validation (400)
    FieldErrors(FieldErrors),

    /// Malformed request (400)
    BadRequest(String),

    /// Bad credentials (401)
    Unauthorized(String),

    /// Route matched no resource (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),
}

impl ApiError {
    /// Single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::FieldErrors(errors)
    }
}

/// Error response format for generic failures
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::TodoMissing(_) => write!(f, "{}", TODO_MISSING_MESSAGE),
            ApiError::FieldErrors(errors) => {
                write!(f, "Validation failed: {} fields", errors.len())
            }
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::TodoMissing(key) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ key: TODO_MISSING_MESSAGE })),
                )
                    .into_response();
            }
            ApiError::FieldErrors(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Convert store errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownUser(id) => ApiError::field(
                "user",
                format!("Invalid pk \"{}\" - object does not exist.", id),
            ),
            StoreError::Database(err) => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}
