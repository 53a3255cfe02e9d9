/// Todo resource endpoints
///
/// # Endpoints
///
/// - `GET    /api/`      - List all todos
/// - `POST   /api/`      - Create a todo owned by the caller
/// - `GET    /api/:id/`  - Retrieve a todo
/// - `PUT    /api/:id/`  - Partially update a todo
/// - `DELETE /api/:id/`  - Delete a todo
///
/// An unknown id is answered with status 400 and
/// `{"rest": "Object with todo id does not exists"}` on GET, or the same
/// message under `"res"` on PUT/DELETE.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FieldErrors},
    schema::{self, FieldKind, RequestSchema, NULL_MESSAGE},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use todo_shared::{
    auth::middleware::AuthContext,
    models::todo::{NewTodo, Todo, TodoChanges, TASK_MAX_LENGTH},
};
use validator::Validate;

/// Body key of the not-found response on GET
const GET_MISSING_KEY: &str = "rest";

/// Body key of the not-found response on PUT and DELETE
const MUTATE_MISSING_KEY: &str = "res";

/// Create todo request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(
        required(message = "This field is required."),
        length(
            max = TASK_MAX_LENGTH,
            message = "Ensure this field has no more than 255 characters."
        )
    )]
    pub task: Option<String>,

    /// Defaults to `false`
    pub complete: Option<bool>,
}

impl RequestSchema for CreateTodoRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] =
        &[("task", FieldKind::Text), ("complete", FieldKind::Boolean)];
}

/// Update todo request. Omitted fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(
        max = TASK_MAX_LENGTH,
        message = "Ensure this field has no more than 255 characters."
    ))]
    pub task: Option<String>,

    pub complete: Option<bool>,
}

impl RequestSchema for UpdateTodoRequest {
    const FIELDS: &'static [(&'static str, FieldKind)] =
        &[("task", FieldKind::Text), ("complete", FieldKind::Boolean)];
}

/// Delete todo response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTodoResponse {
    pub res: String,
}

/// Parses the body and resolves the owner in one pass so that a missing
/// principal is reported alongside any body errors.
fn validate_with_owner<T: RequestSchema>(
    body: Result<Json<Value>, JsonRejection>,
    auth: Option<Extension<AuthContext>>,
) -> ApiResult<(T, i64)> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let parsed = schema::parse::<T>(body);
    let owner = auth.map(|Extension(auth)| auth.user_id);

    match (parsed, owner) {
        (Ok(request), Some(user)) => Ok((request, user)),
        (parsed, owner) => {
            let mut errors: FieldErrors = parsed.err().unwrap_or_default();
            if owner.is_none() {
                errors
                    .entry("user".to_string())
                    .or_default()
                    .push(NULL_MESSAGE.to_string());
            }
            Err(ApiError::FieldErrors(errors))
        }
    }
}

/// Only an unsigned decimal segment names a todo route.
fn todo_id(path: Result<Path<String>, PathRejection>) -> ApiResult<i64> {
    let not_found = || ApiError::NotFound("No todo route matches this path".to_string());

    let Path(segment) = path.map_err(|_| not_found())?;
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_found());
    }

    segment.parse::<i64>().map_err(|_| not_found())
}

/// List todos
///
/// ```text
/// GET /api/
/// ```
///
/// Returns every stored todo as a JSON array.
pub async fn list_todos(State(state): State<AppState>) -> ApiResult<Json<Vec<Todo>>> {
    let todos = state.store.list_all().await?;
    Ok(Json(todos))
}

/// Create todo
///
/// ```text
/// POST /api/
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// { "task": "buy milk", "complete": false }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: field errors, including `user` when the request has
///   no principal
/// - `401 Unauthorized`: invalid bearer token
pub async fn create_todo(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let (req, user) = validate_with_owner::<CreateTodoRequest>(body, auth)?;

    let todo = state
        .store
        .create(NewTodo {
            task: req.task.unwrap_or_default(),
            complete: req.complete.unwrap_or(false),
            user,
        })
        .await?;

    tracing::info!(todo_id = todo.id, user, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Retrieve todo
///
/// ```text
/// GET /api/:id/
/// ```
pub async fn get_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Todo>> {
    let id = todo_id(path)?;

    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::TodoMissing(GET_MISSING_KEY))
}

/// Update todo
///
/// ```text
/// PUT /api/:id/
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// { "complete": true }
/// ```
///
/// The id is checked before the body, so an unknown id wins over a bad body.
/// The owner is rewritten to the caller on every update.
pub async fn update_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    auth: Option<Extension<AuthContext>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Todo>> {
    let id = todo_id(path)?;

    if state.store.get(id).await?.is_none() {
        return Err(ApiError::TodoMissing(MUTATE_MISSING_KEY));
    }

    let (req, user) = validate_with_owner::<UpdateTodoRequest>(body, auth)?;

    // The row can disappear between the lookup and the write
    let todo = state
        .store
        .update(
            id,
            TodoChanges {
                task: req.task,
                complete: req.complete,
                user,
            },
        )
        .await?
        .ok_or(ApiError::TodoMissing(MUTATE_MISSING_KEY))?;

    tracing::info!(todo_id = id, user, "Todo updated");
    Ok(Json(todo))
}

/// Delete todo
///
/// ```text
/// DELETE /api/:id/
/// ```
///
/// Response: `{"res": "Object deleted!"}`
pub async fn delete_todo(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DeleteTodoResponse>> {
    let id = todo_id(path)?;

    if !state.store.delete(id).await? {
        return Err(ApiError::TodoMissing(MUTATE_MISSING_KEY));
    }

    tracing::info!(todo_id = id, "Todo deleted");
    Ok(Json(DeleteTodoResponse {
        res: "Object deleted!".to_string(),
    }))
}
