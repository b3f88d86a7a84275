/// Unified error types for the account service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the account service
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or unusable credential header
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Malformed or mis-signed token
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token past its expiry
    #[error("Token has expired")]
    TokenExpired,

    /// Unknown email or wrong password. Both cases share this variant.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Valid token, but the account is not active
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Authenticated, but not an admin or not the resource owner
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g., duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Illegal lifecycle transition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Profile edit attempted inside the cooldown window
    #[error("Profile can be updated once per cooldown window, next update allowed on {}", .next_allowed_at.format("%Y-%m-%d"))]
    RateLimited { next_allowed_at: DateTime<Utc> },

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_allowed_at: Option<DateTime<Utc>>,
}

impl PlatformError {
    /// HTTP status and stable error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            PlatformError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "Unauthenticated"),
            PlatformError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "InvalidToken"),
            PlatformError::TokenExpired => (StatusCode::UNAUTHORIZED, "ExpiredToken"),
            PlatformError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "InvalidCredentials"),
            PlatformError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            PlatformError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            PlatformError::Validation(_) => (StatusCode::BAD_REQUEST, "InvalidRequest"),
            PlatformError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            PlatformError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            PlatformError::InvalidState(_) => (StatusCode::BAD_REQUEST, "InvalidState"),
            PlatformError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RateLimited"),
            PlatformError::Database(_) | PlatformError::Internal(_) | PlatformError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError")
            }
        }
    }
}

/// Convert PlatformError to HTTP response
impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string() // Don't leak details
        } else {
            self.to_string()
        };

        let next_allowed_at = match &self {
            PlatformError::RateLimited { next_allowed_at } => Some(*next_allowed_at),
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            next_allowed_at,
        });

        (status, body).into_response()
    }
}

/// Result type alias for account service operations
pub type PlatformResult<T> = Result<T, PlatformError>;
