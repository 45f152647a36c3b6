use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// ApiError
///
/// The single error type returned by handlers and middleware. Every variant maps
/// to exactly one status code, and every response body has the same shape:
/// `{"error": "..."}`. Store, hashing and token-signing failures are collapsed
/// into an opaque 500 so internals never leak to the caller.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing request data.
    BadRequest(String),
    /// Authentication failed: missing/invalid token or bad credentials.
    Unauthorized,
    /// Authenticated but lacking the required role.
    Forbidden,
    /// The addressed record does not exist.
    NotFound,
    /// The request conflicts with existing state (duplicate email, double claim).
    Conflict(String),
    /// Any failure from the persistence layer.
    Database(sqlx::Error),
    /// Token signing failed during login.
    Token(jsonwebtoken::errors::Error),
    /// Password hashing failed during user creation.
    Hash(bcrypt::BcryptError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "permission denied".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Database(err) => {
                tracing::error!("database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Token(err) => {
                tracing::error!("token signing error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Hash(err) => {
                tracing::error!("password hashing error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ApiError::Token(err)
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Hash(err)
    }
}
