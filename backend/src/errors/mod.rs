//! Global application error types and handlers.
//!
//! This module defines the error type returned by handlers that talk to the
//! external backend or validate input, and maps each variant to a consistent
//! JSON error response. Authentication failures never reach here: the route
//! guard turns them into redirects before any handler runs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use conduct_adapters::AdapterError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] AdapterError),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UpstreamUnavailable(_) => "UpstreamUnavailable",
            AppError::Validation(_) => "InvalidRequest",
            AppError::Config(_) => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(code = self.code(), error = %self, "request failed");
        }
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let err = AppError::from(AdapterError::Unauthorized);
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "UpstreamUnavailable");
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = AppError::Validation("faculty_id must be an integer".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
