//! HTTP API handlers for lingua-api

pub mod health;
pub mod lingua;
pub mod session;

pub use health::health_routes;
pub use lingua::lingua_routes;
pub use session::session_routes;

use crate::error::ApiError;

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
