//! Runtime configuration.
//!
//! Loaded from YAML or JSON. Every field has a default, so an empty file
//! (or no file) yields a fallback-only pipeline:
//!
//! ```yaml
//! provider:
//!   type: gemini
//!   settings:
//!     base_url: https://generativelanguage.googleapis.com/v1beta
//! completion:
//!   model: gemini-1.5-flash
//!   max_tokens: 2048
//!   temperature: 0.0
//! remote_timeout: 30s
//! fallback_delay: 2s
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::providers::CompletionConfig;

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// Which provider to build, and its provider-specific settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Registered provider type, e.g. "gemini"
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Passed verbatim to the provider (e.g. `api_key`, `base_url`)
    #[serde(default = "empty_settings")]
    pub settings: JsonValue,
}

fn empty_settings() -> JsonValue {
    JsonValue::Object(Default::default())
}

impl ProviderSettings {
    pub fn new(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            settings: empty_settings(),
        }
    }

    pub fn with_settings(mut self, settings: JsonValue) -> Self {
        self.settings = settings;
        self
    }
}

/// Model parameters for remote requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 2048,
            temperature: 0.0,
        }
    }
}

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Remote provider; `None` means fallback only
    pub provider: Option<ProviderSettings>,

    pub completion: CompletionSettings,

    /// Upper bound on one remote round-trip
    #[serde(with = "humantime_duration")]
    pub remote_timeout: Duration,

    /// Simulated processing time before a fallback report
    #[serde(with = "humantime_duration")]
    pub fallback_delay: Duration,
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: None,
            completion: CompletionSettings::default(),
            remote_timeout: Duration::from_secs(30),
            fallback_delay: Duration::from_secs(2),
        }
    }
}

impl RuntimeConfig {
    /// Parse YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validated()
    }

    /// Parse JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Load by extension: `.json` as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_yaml_file(path)
        }
    }

    /// Use the given provider.
    pub fn with_provider(mut self, provider: ProviderSettings) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Drop the provider so every analysis uses the catalog.
    pub fn offline(mut self) -> Self {
        self.provider = None;
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Completion parameters for remote requests.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.completion.model.clone(),
            max_tokens: self.completion.max_tokens,
            temperature: self.completion.temperature,
            timeout: self.remote_timeout,
        }
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.remote_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "remote_timeout must be greater than zero".to_string(),
            ));
        }
        if self.completion.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "completion.model must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "completion.temperature must be within 0.0..=2.0, got {}",
                self.completion.temperature
            )));
        }
        if let Some(provider) = &self.provider {
            if provider.provider_type.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "provider.type must not be empty".to_string(),
                ));
            }
            if !provider.settings.is_object() {
                return Err(ConfigError::ValidationError(
                    "provider.settings must be a mapping".to_string(),
                ));
            }
        }
        Ok(self)
    }
}
