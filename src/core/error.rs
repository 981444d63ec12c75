//! Error type system for the wellness tracker
//!
//! This module provides the error taxonomy for the service with:
//! - HTTP status code mapping
//! - Uniform JSON error responses with trace IDs
//! - Automatic response conversion for Axum handlers

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Main error type for the wellness tracker service
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    // Request-level errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    AuthenticationError(String),

    #[error("{0}")]
    NotFound(String),

    // I/O and background task errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task error: {0}")]
    TaskError(String),
}

impl TrackerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            //
            // Duplicate registration is reported as 400 "Email already
            // registered" rather than 409; that is the service's contract.
            TrackerError::ValidationError(_) | TrackerError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            TrackerError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            // 404 Not Found
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            TrackerError::InitializationError(_)
            | TrackerError::ConfigError(_)
            | TrackerError::DatabaseError(_)
            | TrackerError::IoError(_)
            | TrackerError::TaskError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            TrackerError::InitializationError(_) => "InitializationError",
            TrackerError::ConfigError(_) => "ConfigError",
            TrackerError::DatabaseError(_) => "DatabaseError",
            TrackerError::ValidationError(_) => "ValidationError",
            TrackerError::Conflict(_) => "ConflictError",
            TrackerError::AuthenticationError(_) => "AuthenticationError",
            TrackerError::NotFound(_) => "NotFoundError",
            TrackerError::IoError(_) => "IoError",
            TrackerError::TaskError(_) => "TaskError",
        }
    }

    /// Check if this error is fatal at startup (the process must not serve traffic)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TrackerError::InitializationError(_) | TrackerError::ConfigError(_)
        )
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a TrackerError
    pub fn from_error(error: &TrackerError) -> Self {
        Self::new(error.error_type().to_string(), error.to_string())
    }
}

/// Implement IntoResponse for TrackerError to enable automatic error handling in Axum
impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        // Log the error with trace ID
        tracing::error!(
            error_type = self.error_type(),
            trace_id = %error_response.trace_id,
            status_code = %status_code,
            "Request failed: {}",
            self
        );

        let mut response = (status_code, Json(error_response)).into_response();

        // Unauthorized responses carry the bearer challenge so clients know
        // how to authenticate.
        if status_code == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Result type alias for operations that can fail with TrackerError
pub type Result<T> = std::result::Result<T, TrackerError>;
