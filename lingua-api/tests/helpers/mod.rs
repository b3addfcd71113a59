//! Shared test doubles and request helpers for lingua-api integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use lingua_api::db::{self, SqliteDocumentStore};
use lingua_api::model::{GenerationParams, ModelError, ModelGateway};
use lingua_api::pipeline::PipelineSettings;
use lingua_api::session::{Document, DocumentStore};
use lingua_api::{build_router, AppState, RouterOptions};
use serde_json::Value;
use tower::ServiceExt;

/// What the scripted gateway does when invoked
#[derive(Debug, Clone)]
pub enum Script {
    Reply(String),
    Fail,
    Hang,
}

/// One recorded model invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub prompt: String,
    pub params: GenerationParams,
}

/// Model gateway double that records every call
pub struct ScriptedGateway {
    script: Script,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedGateway {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn run(&self, prompt: &str, params: GenerationParams) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(Invocation {
            prompt: prompt.to_string(),
            params,
        });

        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail => Err(ModelError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

/// Document store whose backend is always down
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn load(&self, _session_id: &str, _document: Document) -> lingua_common::Result<Option<Value>> {
        Err(lingua_common::Error::Internal("backend offline".to_string()))
    }

    async fn save(&self, _session_id: &str, _document: Document, _value: &Value) -> lingua_common::Result<()> {
        Err(lingua_common::Error::Internal("backend offline".to_string()))
    }
}

/// In-memory SQLite store
pub async fn memory_store() -> Arc<SqliteDocumentStore> {
    Arc::new(SqliteDocumentStore::new(db::init_memory_pool().await.unwrap()))
}

/// Test settings: short model timeout so timeout tests finish quickly
pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        model_timeout: Duration::from_millis(200),
        ..PipelineSettings::default()
    }
}

/// Default options with the session document routes mounted
pub fn with_sessions() -> RouterOptions {
    RouterOptions {
        expose_session_routes: true,
        ..RouterOptions::default()
    }
}

/// Router over an in-memory store with the session routes mounted
pub async fn test_app(gateway: Arc<ScriptedGateway>) -> Router {
    let store = memory_store().await;
    build_router(AppState::new(store, gateway, test_settings(), with_sessions()))
}

/// Router over the given store and options
pub fn app_with(store: Arc<dyn DocumentStore>, gateway: Arc<ScriptedGateway>, options: RouterOptions) -> Router {
    build_router(AppState::new(store, gateway, test_settings(), options))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, &body.to_string())
}

pub fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request through a clone of the router
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
