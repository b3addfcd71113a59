//! Configuration resolution for lingua-api
//!
//! Credentials resolve ENV → TOML. Everything else comes straight from the
//! TOML bootstrap file (see `lingua_common::config`).

use lingua_common::config::{LimitsConfig, ModelConfig};
use lingua_common::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

pub const API_TOKEN_ENV_VAR: &str = "LINGUA_MODEL_API_TOKEN";
pub const ACCOUNT_ID_ENV_VAR: &str = "LINGUA_MODEL_ACCOUNT_ID";

/// Model settings with credentials resolved
#[derive(Clone)]
pub struct ResolvedModelConfig {
    pub provider: String,
    pub account_id: String,
    pub api_token: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ResolvedModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedModelConfig")
            .field("provider", &self.provider)
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bounds on glossary data embedded in the detection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlossaryLimits {
    pub max_entries: usize,
    pub max_chars: usize,
}

impl Default for GlossaryLimits {
    fn default() -> Self {
        LimitsConfig::default().into()
    }
}

impl From<LimitsConfig> for GlossaryLimits {
    fn from(limits: LimitsConfig) -> Self {
        Self {
            max_entries: limits.max_glossary_entries,
            max_chars: limits.max_glossary_prompt_chars,
        }
    }
}

/// Resolve model settings and credentials
///
/// **Priority:** ENV → TOML for both the API token and the account id.
pub fn resolve_model_config(model: &ModelConfig) -> Result<ResolvedModelConfig> {
    let api_token = resolve_secret(API_TOKEN_ENV_VAR, model.api_token.as_deref(), "API token").ok_or_else(|| {
        Error::Config(format!(
            "Model API token not configured. Set {} or [model].api_token in the TOML config.",
            API_TOKEN_ENV_VAR
        ))
    })?;

    let account_id = resolve_secret(ACCOUNT_ID_ENV_VAR, model.account_id.as_deref(), "account id")
        .ok_or_else(|| {
            Error::Config(format!(
                "Model account id not configured. Set {} or [model].account_id in the TOML config.",
                ACCOUNT_ID_ENV_VAR
            ))
        })?;

    Ok(ResolvedModelConfig {
        provider: model.provider.clone(),
        account_id,
        api_token,
        model: model.model.clone(),
        base_url: model.base_url.clone(),
        timeout: Duration::from_secs(model.timeout_secs),
    })
}

fn resolve_secret(env_var: &str, toml_value: Option<&str>, label: &str) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_value(v));
    let toml_value = toml_value.filter(|v| is_valid_value(v));

    // Warn if multiple sources (potential misconfiguration)
    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "Model {} found in environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(value) = env_value {
        info!("Model {} loaded from environment variable", label);
        return Some(value);
    }

    toml_value.map(|value| {
        info!("Model {} loaded from TOML config", label);
        value.to_string()
    })
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}
