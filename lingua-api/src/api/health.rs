//! Health check endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// `GET /` response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// `GET /health` response: status, module name and version
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /
pub async fn root_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "lingua-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_status))
        .route("/health", get(health_check))
}
