//! Configuration loading and path resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every section and
//! every key is optional; missing values fall back to built-in defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LINGUA_CONFIG";

/// Directory name used under the platform config/data directories
const APP_DIR: &str = "linguashift";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Mount the internal per-session glossary/prefs routes under `/sessions/:session_id`
    #[serde(default)]
    pub expose_session_routes: bool,

    /// Maximum accepted request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            expose_session_routes: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Session document storage settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// SQLite database file; OS data directory default when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Text-generation provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default)]
    pub account_id: Option<String>,

    /// Prefer `LINGUA_MODEL_API_TOKEN` over storing the token here
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single model invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            account_id: None,
            api_token: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Bounds applied while composing prompts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Glossary entries beyond this count are left out of the detection prompt
    #[serde(default = "default_max_glossary_entries")]
    pub max_glossary_entries: usize,

    /// Maximum length of the serialized glossary embedded in a prompt
    #[serde(default = "default_max_glossary_prompt_chars")]
    pub max_glossary_prompt_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_glossary_entries: default_max_glossary_entries(),
            max_glossary_prompt_chars: default_max_glossary_prompt_chars(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// tracing filter directive (e.g. "info" or "lingua_api=debug")
    #[serde(default)]
    pub level: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_provider() -> String {
    "workers-ai".to_string()
}

fn default_model() -> String {
    "@cf/meta/llama-3.1-8b-instruct-fast".to_string()
}

fn default_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_glossary_entries() -> usize {
    200
}

fn default_max_glossary_prompt_chars() -> usize {
    8000
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.model.timeout_secs == 0 {
            return Err(Error::Config("model.timeout_secs must be greater than 0".to_string()));
        }
        if self.server.max_body_bytes == 0 {
            return Err(Error::Config("server.max_body_bytes must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Database file to open, falling back to the OS data directory
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Config file resolution priority:
/// 1. Command-line argument (must exist)
/// 2. `LINGUA_CONFIG` environment variable (must exist)
/// 3. User config directory (`~/.config/linguashift/config.toml` on Linux)
/// 4. `/etc/linguashift/config.toml` (Unix only)
///
/// Returns `Ok(None)` when no implicit location holds a file.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<Option<PathBuf>> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return existing(path.to_path_buf()).map(Some);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return existing(PathBuf::from(path)).map(Some);
        }
    }

    // Priority 3: User config directory
    if let Some(path) = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml")) {
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // Priority 4: System-wide config
    if cfg!(unix) {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }
    }

    debug!("No config file in implicit locations");
    Ok(None)
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {}", path.display())))
    }
}

/// Get OS-dependent default database path
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./linguashift_data"))
        .join("lingua.db")
}
