use axum::{http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Application error type
///
/// Covers the marketplace error taxonomy (validation, missing resources,
/// permission, booking conflicts, storage outages) plus the ambient failures
/// of the HTTP and realtime layers.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Serialization Errors =====
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Database & Storage Errors =====
    /// Storage unavailable or failed mid-operation. No partial mutation is
    /// visible, so the whole operation may be retried.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage temporarily unavailable: {0}")]
    TransientStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ===== Authentication & Authorization Errors =====
    /// No usable identity on the request
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Identity is known but may not act on the target resource
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // ===== Validation Errors =====
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Config(String),

    // ===== Internal Server Errors =====
    #[error("Internal server error: {0}")]
    Internal(String),

    // ===== Unknown/Generic Errors =====
    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::TransientStore(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(msg) => format!("Authentication failed: {}", msg),
            AppError::Unauthorized(msg) => format!("Not allowed: {}", msg),
            AppError::Validation(msg) => format!("Validation error: {}", msg),
            AppError::Json(_) => "Malformed request body".to_string(),
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Database(_) | AppError::TransientStore(_) => {
                "Storage temporarily unavailable, please retry".to_string()
            }
            AppError::Config(msg) => format!("Configuration error: {}", msg),
            AppError::Internal(msg) => format!("Internal error: {}", msg),
            _ => "Internal server error".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "AUTH_REQUIRED",
            AppError::Unauthorized(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Json(_) => "INVALID_FORMAT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) | AppError::TransientStore(_) => "STORE_UNAVAILABLE",
            AppError::Io(_) => "IO_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Safe to retry the whole operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::TransientStore(_))
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                error = %self,
                error_code = %code,
                "Authorization failed"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                "Client error occurred"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let error_code = self.error_code();

        let response_body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Never expose internal details to the client
            json!({
                "error": "Internal server error",
                "error_code": error_code,
                "status": status.as_u16(),
            })
        } else {
            json!({
                "error": self.user_message(),
                "error_code": error_code,
                "status": status.as_u16(),
            })
        };

        (status, axum::Json(response_body)).into_response()
    }
}

// ============================================================================
// Helper functions for creating common errors
// ============================================================================

impl AppError {
    /// Create an authentication error (401)
    pub fn auth(msg: impl Into<String>) -> Self {
        AppError::Auth(msg.into())
    }

    /// Create a permission error (403)
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Create a conflict error (409)
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    /// Create an internal server error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
