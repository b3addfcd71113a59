//! Cloudflare Workers AI REST client
//!
//! `POST {base_url}/accounts/{account_id}/ai/run/{model}` with a bearer token.
//! Responses arrive in the Cloudflare envelope:
//! `{"success": true, "result": {"response": "..."}, "errors": []}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{GenerationParams, ModelError, ModelGateway};
use crate::config::ResolvedModelConfig;

const USER_AGENT: &str = concat!("linguashift/", env!("CARGO_PKG_VERSION"));

/// Request body for text-generation models
#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<RunResult>,
    #[serde(default)]
    errors: Vec<EnvelopeMessage>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    #[serde(default)]
    response: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeMessage {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

/// Workers AI model gateway
pub struct WorkersAiGateway {
    http: Client,
    run_url: String,
    api_token: String,
    timeout: Duration,
}

impl WorkersAiGateway {
    pub fn from_config(config: &ResolvedModelConfig) -> Result<Self, ModelError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            run_url: run_url(&config.base_url, &config.account_id, &config.model),
            api_token: config.api_token.clone(),
            timeout: config.timeout,
        })
    }
}

impl WorkersAiGateway {
    /// The client timeout covers the body read as well as the send
    fn transport_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            ModelError::Network(e)
        }
    }
}

#[async_trait]
impl ModelGateway for WorkersAiGateway {
    fn provider(&self) -> &str {
        "workers-ai"
    }

    async fn run(&self, prompt: &str, params: GenerationParams) -> Result<String, ModelError> {
        debug!(
            prompt_len = prompt.len(),
            temperature = params.temperature,
            max_tokens = params.max_output_tokens,
            "Invoking Workers AI"
        );

        let body = RunRequest {
            prompt,
            temperature: params.temperature,
            max_tokens: params.max_output_tokens,
        };

        let response = self
            .http
            .post(&self.run_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: envelope_error_message(&text).unwrap_or_else(|| status.to_string()),
            });
        }

        let output = extract_response_text(&text)?;
        debug!(output_len = output.len(), "Workers AI responded");
        Ok(output)
    }
}

fn run_url(base_url: &str, account_id: &str, model: &str) -> String {
    format!(
        "{}/accounts/{}/ai/run/{}",
        base_url.trim_end_matches('/'),
        account_id,
        model.trim_start_matches('/')
    )
}

/// Pull the generated text out of a successful envelope
///
/// A missing or null `response` is degenerate output and yields an empty
/// string. Some models hand back already-decoded JSON in `response`; that is
/// re-serialized so callers always see text.
fn extract_response_text(body: &str) -> Result<String, ModelError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| ModelError::InvalidResponse(format!("Envelope parse failed: {}", e)))?;

    if !envelope.success {
        let message = join_errors(&envelope.errors).unwrap_or_else(|| "success=false".to_string());
        return Err(ModelError::Api { status: 200, message });
    }

    let result = envelope
        .result
        .ok_or_else(|| ModelError::InvalidResponse("Envelope has no result".to_string()))?;

    Ok(match result.response {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

fn envelope_error_message(body: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_str(body).ok()?;
    join_errors(&envelope.errors)
}

fn join_errors(errors: &[EnvelopeMessage]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("{}: {}", code, e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; "),
    )
}
