/// Bearer-token principal extraction
///
/// Requests may carry `Authorization: Bearer <jwt>`. [`authenticate`]
/// validates the token and yields the [`AuthContext`] of the caller; the API
/// server's middleware inserts it into the request extensions. Requests
/// without the header are anonymous, and each handler decides whether it
/// needs a principal.
///
/// # Example
///
/// ```
/// use axum::http::HeaderMap;
/// use todo_shared::auth::middleware::authenticate;
///
/// let anonymous = authenticate(&HeaderMap::new(), "a-secret-that-is-at-least-32-bytes-long");
/// assert!(anonymous.unwrap().is_none());
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, JwtError};

/// The authenticated principal of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Id of the user the token was issued to
    pub user_id: i64,
}

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Resolves the principal from request headers.
///
/// Returns `Ok(None)` when no `Authorization` header is present.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Option<AuthContext>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, secret)?;

    Ok(Some(AuthContext {
        user_id: claims.sub,
    }))
}
