//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// No credentials were presented.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Credentials were presented but did not verify.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

impl AppError {
    /// HTTP status and stable machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Duplicate(_) => (StatusCode::BAD_REQUEST, "DUPLICATE"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AppError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Timeout(_)
            | AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Validation(msg)
            | AppError::Duplicate(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthenticated(msg)
            | AppError::InvalidToken(msg)
            | AppError::Forbidden(msg) => msg.clone(),
            // Server-side failures are logged in full and collapsed for the client
            AppError::Database(e) => {
                error!("Database error: {:?}", e);
                "Server error".to_string()
            }
            AppError::Pool(e) => {
                error!("Pool error: {:?}", e);
                "Server error".to_string()
            }
            AppError::Timeout(msg) => {
                error!("Timed out: {}", msg);
                "Server error".to_string()
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                "Server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: message,
            code,
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(describe_validation_errors(&errors))
    }
}

/// Flatten validator output into a single readable sentence
fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_auth_failures_are_distinct_statuses() {
        let (unauth, _) = AppError::Unauthenticated("x".into()).status_and_code();
        let (invalid, _) = AppError::InvalidToken("x".into()).status_and_code();
        let (forbidden, _) = AppError::Forbidden("x".into()).status_and_code();

        assert_eq!(unauth, StatusCode::UNAUTHORIZED);
        assert_eq!(invalid, StatusCode::UNAUTHORIZED);
        assert_eq!(forbidden, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_duplicate_is_bad_request() {
        let (status, code) = AppError::Duplicate("email".into()).status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "DUPLICATE");
    }

    #[tokio::test]
    async fn test_internal_error_does_not_leak_details() {
        let response = AppError::Internal("connection refused on 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Server error");
        assert_eq!(body["code"], "SERVER_ERROR");
    }
}
