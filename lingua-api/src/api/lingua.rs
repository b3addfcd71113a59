//! Detect and rewrite endpoints
//!
//! Bodies are read as raw bytes and decoded leniently: a body that is not a
//! JSON object of the expected shape is treated like one with every field
//! missing, so it is rejected by validation with the standard 400 body.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use lingua_common::types::{DetectRequest, DetectionResponse, RewriteRequest, RewriteResponse};
use serde::de::DeserializeOwned;

use crate::error::ApiResult;
use crate::pipeline::{ValidatedDetect, ValidatedRewrite};
use crate::AppState;

/// POST /api/detect
pub async fn detect(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<DetectionResponse>> {
    let request = ValidatedDetect::try_from(decode_body::<DetectRequest>(&body))?;
    Ok(Json(state.pipeline.detect(request).await?))
}

/// POST /api/rewrite
pub async fn rewrite(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<RewriteResponse>> {
    let request = ValidatedRewrite::try_from(decode_body::<RewriteRequest>(&body))?;
    Ok(Json(state.pipeline.rewrite(request).await?))
}

fn decode_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

/// Build detect/rewrite routes
pub fn lingua_routes() -> Router<AppState> {
    Router::new()
        .route("/api/detect", post(detect))
        .route("/api/rewrite", post(rewrite))
}
