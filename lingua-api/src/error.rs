//! Error types for lingua-api
//!
//! Every failure maps to a JSON body of the form `{"error": "..."}`. Upstream
//! diagnostics are logged here and never copied into the response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lingua_common::types::ErrorResponse;
use thiserror::Error;
use tracing::{error, warn};

use crate::model::ModelError;

/// Body text returned for requests missing `message` or `sessionId`
pub const REQUIRED_FIELDS_MESSAGE: &str = "message and sessionId are required";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing required request fields (400)
    #[error("{}", REQUIRED_FIELDS_MESSAGE)]
    Validation,

    /// Model invocation failed (502)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),

    /// Session document store failed (503)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] lingua_common::Error),

    /// Unknown route or method (404)
    #[error("Not found")]
    NotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::ModelUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ApiError::Validation => REQUIRED_FIELDS_MESSAGE,
            ApiError::ModelUnavailable(_) => "model unavailable",
            ApiError::StorageUnavailable(_) => "storage unavailable",
            ApiError::NotFound => "not found",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::ModelUnavailable(err) => warn!(error = %err, "Model invocation failed"),
            ApiError::StorageUnavailable(err) => error!(error = %err, "Session store failed"),
            ApiError::Validation | ApiError::NotFound => {}
        }

        let body = Json(ErrorResponse::new(self.public_message()));
        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
