//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested record (user, lesson, ...) was not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller is authenticated but not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing, malformed or expired credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] crate::auth::AuthError),

    /// The upstream language model call failed
    #[error("Language model error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Client-facing message for upstream model failures
const LLM_UNAVAILABLE: &str = "Language model unavailable";

impl AppError {
    /// Message returned in the response body; model failure details are
    /// only logged
    fn client_message(&self) -> String {
        match self {
            AppError::Llm(_) => LLM_UNAVAILABLE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = Json(json!({
            "error": self.client_message(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
