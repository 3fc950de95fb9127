//! Configuration loading, validation, and management for Scribbly.
//!
//! Loads configuration from `~/.scribbly/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.scribbly/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-generation provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Pipeline policy: rate limits, cache, safety
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Where the provider lives and how patiently we talk to it.
///
/// A missing `api_key` disables the provider entirely; the pipeline then
/// answers from the local heuristics only.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-attempt timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-level retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "deepseek/deepseek-v3".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    800
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// When the rate limiter is charged relative to the input safety check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionOrder {
    /// Sensitive requests are rejected before they consume a slot.
    #[default]
    AfterSafetyCheck,
    /// Every non-empty request consumes a slot, sensitive or not.
    BeforeSafetyCheck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Admitted calls per client per window
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_window: usize,

    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Length of the heuristic summary, in characters
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,

    /// Case-insensitive substrings that mark content as sensitive
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    #[serde(default)]
    pub admission_order: AdmissionOrder,
}

fn default_rate_limit() -> usize {
    10
}
fn default_rate_window_secs() -> u64 {
    60
}
fn default_cache_ttl_secs() -> u64 {
    60 * 60 * 24
}
fn default_summary_chars() -> usize {
    120
}
fn default_denylist() -> Vec<String> {
    vec!["bad".into(), "evil".into()]
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_window: default_rate_limit(),
            rate_window_secs: default_rate_window_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            summary_chars: default_summary_chars(),
            denylist: default_denylist(),
            admission_order: AdmissionOrder::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// How often expired cache entries are physically dropped
    #[serde(default = "default_cache_sweep_secs")]
    pub cache_sweep_secs: u64,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_cache_sweep_secs() -> u64 {
    600
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cache_sweep_secs: default_cache_sweep_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.scribbly/config.toml).
    ///
    /// Also checks environment variables:
    /// - `SCRIBBLY_API_KEY` (highest priority), `OPENROUTER_API_KEY`, `OPENAI_API_KEY`
    /// - `OPENROUTER_BASE_URL`
    /// - `OPENROUTER_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("SCRIBBLY_API_KEY")
            .or_else(|| non_empty("OPENROUTER_API_KEY"))
            .or_else(|| non_empty("OPENAI_API_KEY"))
        {
            self.provider.api_key = Some(key);
        }

        if let Some(url) = non_empty("OPENROUTER_BASE_URL") {
            self.provider.base_url = url;
        }

        if let Some(model) = non_empty("OPENROUTER_MODEL") {
            self.provider.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".scribbly")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be > 0".into(),
            ));
        }
        if self.assistant.rate_limit_per_window == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.rate_limit_per_window must be > 0".into(),
            ));
        }
        if self.assistant.rate_window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.rate_window_secs must be > 0".into(),
            ));
        }
        if self.assistant.cache_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.cache_ttl_secs must be > 0".into(),
            ));
        }
        if self.assistant.summary_chars == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.summary_chars must be > 0".into(),
            ));
        }
        if self.gateway.cache_sweep_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.cache_sweep_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Whether a provider credential is available.
    pub fn has_api_key(&self) -> bool {
        self.provider
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
