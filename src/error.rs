//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use crate::store::StoreError;
use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Callers should treat `StoreUnavailable` as retryable, the not-found
/// variants as terminal for that identifier, and the invalid-input variants
/// as caller errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Backing store could not be reached or timed out
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// No snapshot has the given identifier
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(i64),

    /// No employee matches the given identifier or safe name
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    /// Snapshot exists but its bytes cannot be located
    #[error("Artifact missing: {0}")]
    ArtifactMissing(String),

    /// Requested limit is outside the accepted range
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    /// Path escapes the snapshot root or cannot be resolved
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Request is missing required parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or wrong access token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SnapshotNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ArtifactMissing(_) => StatusCode::NOT_FOUND,
            AppError::InvalidLimit(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
            "retryable": self.is_retryable(),
        }));

        (status, body).into_response()
    }
}
