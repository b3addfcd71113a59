//! Text-generation model gateway
//!
//! The gateway is the single integration point with the model provider:
//! prompt plus sampling parameters in, raw text out. Nothing about the output
//! grammar is assumed here.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

mod workers_ai;

pub use workers_ai::WorkersAiGateway;

use crate::config::ResolvedModelConfig;

/// Sampling parameters for one model invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Low temperature, capped output: favors well-formed JSON
pub const DETECTION_PARAMS: GenerationParams = GenerationParams {
    temperature: 0.3,
    max_output_tokens: 600,
};

/// Higher temperature: favors fluent prose over strict structure
pub const REWRITE_PARAMS: GenerationParams = GenerationParams {
    temperature: 0.5,
    max_output_tokens: 400,
};

/// Errors that can occur while invoking the model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Model provider not configured: {0}")]
    NotConfigured(String),
}

/// Invoke a text-generation model
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Provider identifier used in logs (e.g. "workers-ai")
    fn provider(&self) -> &str;

    /// Run the model once and return its raw text output
    async fn run(&self, prompt: &str, params: GenerationParams) -> Result<String, ModelError>;
}

/// Create a model gateway for the configured provider
///
/// Supports "workers-ai".
pub fn create_gateway(config: &ResolvedModelConfig) -> Result<Arc<dyn ModelGateway>, ModelError> {
    debug!(provider = %config.provider, model = %config.model, "create_gateway: called");
    match config.provider.as_str() {
        "workers-ai" => Ok(Arc::new(WorkersAiGateway::from_config(config)?)),
        other => Err(ModelError::NotConfigured(format!(
            "Unknown model provider: '{}'. Supported: workers-ai",
            other
        ))),
    }
}
