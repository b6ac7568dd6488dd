//! Error types for the Personal AI hub.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Primary document backend errors.
///
/// These never leave the resilient store: every variant is absorbed there
/// and triggers the in-process fallback.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend {0} is unavailable")]
    Unavailable(String),

    #[error("Backend call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Chat model errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// External compression service errors.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    #[error("Compression request failed: {0}")]
    RequestFailed(String),

    #[error("Compression service returned status {0}")]
    Status(u16),

    #[error("Invalid compression response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    External(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::External(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<axum::extract::rejection::QueryRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<CompressionError> for ApiError {
    fn from(e: CompressionError) -> Self {
        Self::External(e.to_string())
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        Self::External(e.to_string())
    }
}

/// Result type alias for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Reject `value` when it is shorter than `min` characters.
pub fn require_len(field: &str, value: &str, min: usize) -> ApiResult<()> {
    if value.chars().count() < min {
        return Err(ApiError::Validation(format!(
            "{field} must be at least {min} character{}",
            if min == 1 { "" } else { "s" }
        )));
    }
    Ok(())
}
