//! Detect and rewrite request pipeline
//!
//! RECEIVED → VALIDATED → SESSION_RESOLVED (detect only) → MODEL_INVOKED → RESPONDED.
//! Validation is a type conversion: only [`ValidatedDetect`] and
//! [`ValidatedRewrite`] values reach the session store or the model, so a
//! rejected request never performs I/O.

use lingua_common::types::{DetectRequest, DetectionResponse, RewriteRequest, RewriteResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::GlossaryLimits;
use crate::error::ApiError;
use crate::model::{GenerationParams, ModelError, ModelGateway, DETECTION_PARAMS, REWRITE_PARAMS};
use crate::parser::{parse_detection, parse_rewrite};
use crate::prompts::{bounded_glossary, build_detection_prompt, build_rewrite_prompt};
use crate::session::SessionRegistry;

/// Detection request with required fields present
#[derive(Debug, Clone)]
pub struct ValidatedDetect {
    pub message: String,
    pub session_id: String,
}

impl TryFrom<DetectRequest> for ValidatedDetect {
    type Error = ApiError;

    fn try_from(request: DetectRequest) -> Result<Self, Self::Error> {
        let (message, session_id) = required(request.message, request.session_id)?;
        Ok(Self { message, session_id })
    }
}

/// Rewrite request with required fields present
#[derive(Debug, Clone)]
pub struct ValidatedRewrite {
    pub message: String,
    pub session_id: String,
    pub audience: Option<String>,
    pub tone: Option<String>,
}

impl TryFrom<RewriteRequest> for ValidatedRewrite {
    type Error = ApiError;

    fn try_from(request: RewriteRequest) -> Result<Self, Self::Error> {
        let (message, session_id) = required(request.message, request.session_id)?;
        Ok(Self {
            message,
            session_id,
            audience: request.audience,
            tone: request.tone,
        })
    }
}

/// Empty strings count as missing
fn required(message: Option<String>, session_id: Option<String>) -> Result<(String, String), ApiError> {
    match (message, session_id) {
        (Some(message), Some(session_id)) if !message.is_empty() && !session_id.is_empty() => {
            Ok((message, session_id))
        }
        _ => Err(ApiError::Validation),
    }
}

/// Tunables for the pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Bound on a single model invocation
    pub model_timeout: Duration,
    pub glossary_limits: GlossaryLimits,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model_timeout: Duration::from_secs(30),
            glossary_limits: GlossaryLimits::default(),
        }
    }
}

/// Composes session state, prompts, the model and the parser
pub struct LinguaPipeline {
    sessions: Arc<SessionRegistry>,
    gateway: Arc<dyn ModelGateway>,
    settings: PipelineSettings,
}

impl LinguaPipeline {
    pub fn new(sessions: Arc<SessionRegistry>, gateway: Arc<dyn ModelGateway>, settings: PipelineSettings) -> Self {
        Self {
            sessions,
            gateway,
            settings,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Detect jargon in a message using the session's glossary as context
    ///
    /// Malformed model output is not an error: it yields the fallback response.
    pub async fn detect(&self, request: ValidatedDetect) -> Result<DetectionResponse, ApiError> {
        let session = self.sessions.resolve(&request.session_id);
        let glossary = session.get_glossary().await?;
        let glossary_in_prompt = bounded_glossary(&glossary, &self.settings.glossary_limits);
        debug!(
            session_id = %request.session_id,
            stored = glossary.len(),
            in_prompt = glossary_in_prompt.len(),
            "detect: session resolved"
        );

        let prompt = build_detection_prompt(&request.message, glossary_in_prompt);
        let raw = self.invoke(&prompt, DETECTION_PARAMS).await?;

        let parsed = parse_detection(raw);
        info!(
            session_id = %request.session_id,
            message_len = request.message.len(),
            parsed = parsed.is_parsed(),
            "detect: responded"
        );
        Ok(parsed.into())
    }

    /// Rewrite a message for an audience and tone
    pub async fn rewrite(&self, request: ValidatedRewrite) -> Result<RewriteResponse, ApiError> {
        let prompt = build_rewrite_prompt(&request.message, request.audience.as_deref(), request.tone.as_deref());
        let raw = self.invoke(&prompt, REWRITE_PARAMS).await?;

        info!(
            session_id = %request.session_id,
            message_len = request.message.len(),
            output_len = raw.len(),
            "rewrite: responded"
        );
        Ok(parse_rewrite(raw))
    }

    /// Run the model once under the configured timeout; no retries
    async fn invoke(&self, prompt: &str, params: GenerationParams) -> Result<String, ApiError> {
        debug!(
            provider = self.gateway.provider(),
            prompt_len = prompt.len(),
            "Invoking model"
        );

        match tokio::time::timeout(self.settings.model_timeout, self.gateway.run(prompt, params)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ModelError::Timeout(self.settings.model_timeout).into()),
        }
    }
}
