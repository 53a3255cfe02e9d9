/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todo_api::{app::{build_router, AppState}, config::Config};
/// use todo_shared::store::MemoryTodoStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryTodoStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use todo_shared::{auth::middleware::authenticate, store::TodoStore};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Todo record store
    pub store: Arc<dyn TodoStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Secret for validating bearer tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health
/// ├── GET    /api/         list todos
/// ├── POST   /api/         create todo
/// ├── GET    /api/:id/     retrieve todo
/// ├── PUT    /api/:id/     update todo
/// └── DELETE /api/:id/     delete todo
/// ```
///
/// Todo routes also answer without the trailing slash.
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, principal
/// extraction (todo routes only).
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{health, todos};

    let collection = get(todos::list_todos).post(todos::create_todo);
    let item = get(todos::get_todo)
        .put(todos::update_todo)
        .delete(todos::delete_todo);

    let todo_routes = Router::new()
        .route("/api", collection.clone())
        .route("/api/", collection)
        .route("/api/:id", item.clone())
        .route("/api/:id/", item)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            principal_layer,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(todo_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Inserts the request principal, if any, into request extensions.
///
/// Anonymous requests pass through; a present but invalid token is a 401.
async fn principal_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(auth) = authenticate(req.headers(), state.jwt_secret())? {
        tracing::debug!(user_id = auth.user_id, "Authenticated request");
        req.extensions_mut().insert(auth);
    }

    Ok(next.run(req).await)
}
