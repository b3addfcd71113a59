//! Session document endpoints
//!
//! Internal boundary for curating a session's glossary and preferences.
//! Any method other than GET/POST on these paths answers 404.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::debug;

use super::not_found;
use crate::error::ApiResult;
use crate::session::{Glossary, PreferenceSet};
use crate::AppState;

/// GET /sessions/:session_id/glossary
pub async fn get_glossary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Glossary>> {
    let glossary = state.sessions().resolve(&session_id).get_glossary().await?;
    Ok(Json(glossary))
}

/// POST /sessions/:session_id/glossary
///
/// Body: `{ "glossary": [...] }`. A missing or non-list `glossary` stores `[]`.
pub async fn put_glossary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let glossary = match decode_value(&body) {
        Value::Object(mut fields) => fields.remove("glossary").unwrap_or(Value::Null),
        _ => Value::Null,
    };
    debug!(session_id = %session_id, is_list = glossary.is_array(), "Storing glossary");

    state.sessions().resolve(&session_id).put_glossary(glossary).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /sessions/:session_id/prefs
pub async fn get_prefs(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<PreferenceSet>> {
    let prefs = state.sessions().resolve(&session_id).get_prefs().await?;
    Ok(Json(prefs))
}

/// POST /sessions/:session_id/prefs
///
/// The whole body is the preference mapping; anything else stores `{}`.
pub async fn put_prefs(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let prefs = decode_value(&body);
    debug!(session_id = %session_id, is_map = prefs.is_object(), "Storing prefs");

    state.sessions().resolve(&session_id).put_prefs(prefs).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn decode_value(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// Build session document routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sessions/:session_id/glossary",
            get(get_glossary).post(put_glossary).fallback(not_found),
        )
        .route(
            "/sessions/:session_id/prefs",
            get(get_prefs).post(put_prefs).fallback(not_found),
        )
}
