//! # Error Handling and Response Types
//!
//! Standardized error types and JSON error bodies for every API endpoint.
//!
//! ## Error Response Format
//!
//! ```json
//! {
//!   "error": "Human-readable error message",
//!   "code": "machine_readable_error_code",
//!   "details": {...},
//!   "timestamp": "2024-01-01T12:00:00Z"
//! }
//! ```
//!
//! ## Error Classifications
//!
//! - **Validation Errors** (400 Bad Request): malformed package name or version
//! - **Not Found** (404 Not Found): unknown routes and assets
//! - **Upstream Errors** (502 Bad Gateway): the file listing service failed;
//!   the client only ever sees [`ERROR_FILE_LIST_FETCH_FAILED`]
//! - **Internal Errors** (500 Internal Server Error): server-side errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::constants::ERROR_FILE_LIST_FETCH_FAILED;
use crate::upstream::UpstreamError;
use crate::validation::ValidationError;

/// Standardized error response structure for consistent API error handling
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,          // Human-readable error message
    pub code: String,           // Machine-readable error code
    pub details: Option<Value>, // Additional error details
    pub timestamp: String,      // ISO 8601 timestamp
}

/// Error code classification for machine-readable error types
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    UpstreamError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::NotFound => "not_found",
            ErrorCode::UpstreamError => "upstream_error",
            ErrorCode::InternalError => "internal_error",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application-specific error types with error codes
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The message is fixed; the source is only logged.
    #[error("{}", ERROR_FILE_LIST_FETCH_FAILED)]
    Upstream(#[source] UpstreamError),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        AppError::Upstream(err)
    }
}

impl AppError {
    /// Get the appropriate error code for this error type
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Upstream(_) => ErrorCode::UpstreamError,
            AppError::Io(_) | AppError::Json(_) | AppError::InternalError(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Get additional error details if available
    pub fn details(&self) -> Option<Value> {
        match self {
            AppError::Validation(e) => Some(json!({ "field": e.field() })),
            _ => None,
        }
    }

    /// Create a standardized error response
    pub fn to_error_response(&self) -> ApiErrorResponse {
        let code = self.error_code();
        ApiErrorResponse {
            error: self.to_string(),
            code: code.as_str().to_string(),
            details: self.details(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.error_code().http_status();

        match &self {
            AppError::Upstream(source) => {
                tracing::error!(error = %self, source = %source, "Upstream request failed");
            }
            AppError::Validation(_) => tracing::debug!(error = %self, "Rejected request"),
            _ => tracing::error!(error = %self, "Request failed"),
        }

        let error_response = self.to_error_response();
        tracing::debug!(status = %status, code = %error_response.code, "Returning standardized error response");

        (status, axum::Json(error_response)).into_response()
    }
}

/// Convenient result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_hide_their_source() {
        let err = AppError::from(UpstreamError::Status {
            status: 503,
            url: "https://data.jsdelivr.com/v1/packages/npm/secret@1.0.0".to_string(),
        });

        let body = err.to_error_response();
        assert_eq!(body.error, ERROR_FILE_LIST_FETCH_FAILED);
        assert_eq!(body.code, "upstream_error");
        assert!(body.details.is_none());
        assert_eq!(err.error_code().http_status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::from(ValidationError::MissingVersion);
        assert_eq!(err.error_code().http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_error_response().code, "validation_error");
    }
}
