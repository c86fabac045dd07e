// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No presence record for resource: {0}")]
    ResourceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Internal(_) => "INT_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::ResourceNotFound(_) => "NF_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
            AppError::RateLimitExceeded => "RATE_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::ResourceNotFound(_) => "Resource not found".to_string(),
            AppError::Io(_) => "Internal server error".to_string(),
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::RateLimitExceeded => {
                "Rate limit exceeded, please try again later".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AppError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AppError::Internal("Failed to send message".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_app_error_display() {
        let input_error = AppError::InvalidInput("viewerId must not be empty".to_string());
        assert_eq!(
            input_error.to_string(),
            "Invalid input: viewerId must not be empty"
        );

        let io_error = AppError::Io(IoError::new(ErrorKind::NotFound, "File not found"));
        assert!(io_error.to_string().contains("IO error"));

        let rate_limit_error = AppError::RateLimitExceeded;
        assert_eq!(rate_limit_error.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::InvalidInput("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ResourceNotFound("s1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );

        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        assert_eq!(
            AppError::Json(json_err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_error_codes() {
        assert_eq!(
            AppError::InvalidInput("test".to_string()).error_code(),
            "VAL_001"
        );
        assert_eq!(
            AppError::ResourceNotFound("s1".to_string()).error_code(),
            "NF_001"
        );
        assert_eq!(
            AppError::Internal("test".to_string()).error_code(),
            "INT_001"
        );
        assert_eq!(AppError::RateLimitExceeded.error_code(), "RATE_001");
    }

    #[test]
    fn test_validation_error_maps_to_invalid_input() {
        let err: AppError = crate::validation::validate_resource_id("").unwrap_err().into();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_serialization() {
        let error = AppError::ResourceNotFound("s1".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response_headers = response.headers();
        assert!(response_headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));
    }
}
