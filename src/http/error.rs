//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::remote::RemoteError;
use crate::services::{AnalysisError, CompareError};
use crate::store::StoreError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// History store error
    Store(StoreError),
    /// Imagery or geocoding service error
    Remote(RemoteError),
}

fn store_error(err: StoreError) -> (StatusCode, ApiError) {
    let (status, code) = match &err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        StoreError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        StoreError::IoError { .. } => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
        StoreError::ConfigurationError { .. } => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
        StoreError::SerializationError { .. } | StoreError::InternalError { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR")
        }
    };
    (status, ApiError::new(code, err.to_string()))
}

fn remote_error(err: RemoteError) -> (StatusCode, ApiError) {
    let (status, code) = match &err {
        // Local misconfiguration: the service cannot serve this until fixed
        RemoteError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONFIGURED"),
        RemoteError::Authentication(_) => (StatusCode::BAD_GATEWAY, "AUTHENTICATION_FAILED"),
        RemoteError::Service { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
        RemoteError::Schema { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_SCHEMA"),
        RemoteError::Transport(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_UNREACHABLE"),
    };
    (status, ApiError::new(code, err.to_string()))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Store(err) => store_error(err),
            AppError::Remote(err) => remote_error(err),
        };

        (status, Json(error)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        AppError::Remote(err)
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Remote(inner) => AppError::Remote(inner),
            AnalysisError::Store(inner) => AppError::Store(inner),
        }
    }
}

impl From<CompareError> for AppError {
    fn from(err: CompareError) -> Self {
        match err {
            CompareError::Selection { .. } => AppError::BadRequest(err.to_string()),
            CompareError::MissingRecord { .. } => AppError::NotFound(err.to_string()),
            CompareError::Store(inner) => AppError::Store(inner),
        }
    }
}
