//! lingua-api library interface
//!
//! Session-scoped jargon detection and rewrite service. Exposes the router
//! and its building blocks for the binary and for integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod session;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use lingua_common::config::ServerConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::model::ModelGateway;
use crate::pipeline::{LinguaPipeline, PipelineSettings};
use crate::session::{DocumentStore, SessionRegistry};

/// Router-level switches taken from `[server]`
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub expose_session_routes: bool,
    pub max_body_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        (&ServerConfig::default()).into()
    }
}

impl From<&ServerConfig> for RouterOptions {
    fn from(server: &ServerConfig) -> Self {
        Self {
            expose_session_routes: server.expose_session_routes,
            max_body_bytes: server.max_body_bytes,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<LinguaPipeline>,
    pub options: RouterOptions,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gateway: Arc<dyn ModelGateway>,
        settings: PipelineSettings,
        options: RouterOptions,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(store));
        Self {
            pipeline: Arc::new(LinguaPipeline::new(sessions, gateway, settings)),
            options,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        self.pipeline.sessions()
    }
}

/// Permissive CORS: any origin, `Content-Type`, GET/POST/OPTIONS
///
/// Preflight (`OPTIONS`) requests are answered by the layer itself.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(api::health_routes())
        .merge(api::lingua_routes());

    if state.options.expose_session_routes {
        router = router.merge(api::session_routes());
    }

    let max_body_bytes = state.options.max_body_bytes;

    router
        .fallback(api::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
