//! Vision provider abstractions for inspector-runtime.
//!
//! This module defines the trait for multimodal (image + text) providers,
//! the Gemini implementation, and [`build_provider`], which turns the
//! `provider` section of a [`RuntimeConfig`](crate::RuntimeConfig) into one.
//!
//! API keys are held in an [`ApiCredential`] from the moment they are read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ProviderSettings;
use crate::image::InlineImage;

mod gemini;
pub mod secrets;

pub use gemini::{GeminiProvider, GEMINI_API_KEY_ENV};
pub use secrets::ApiCredential;

/// Provider types [`build_provider`] understands.
pub const PROVIDER_TYPES: &[&str] = &["gemini"];

/// Errors from vision providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature (0.0 for deterministic)
    pub temperature: f32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            max_tokens: 2048,
            temperature: 0.0,
            timeout: Duration::from_secs(30),
        }
    }
}

/// One image plus the instruction describing what to do with it.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Framing for the model, sent separately where the API allows
    pub system: Option<String>,

    /// The task instruction
    pub instruction: String,

    /// The image, already encoded for transport
    pub image: InlineImage,

    /// Structured-output hint, if the provider supports one
    pub response_schema: Option<JsonValue>,
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text, unparsed
    pub content: String,

    /// Token usage
    pub usage: TokenUsage,

    /// Model that answered
    pub model: String,

    /// Why generation stopped
    pub finish_reason: Option<String>,
}

/// Token usage from a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt (image included)
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Provider abstraction allows swapping vision backends.
///
/// This is the ONLY place where remote model calls are made.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send one image and instruction, return the raw text answer.
    async fn complete(
        &self,
        request: VisionRequest,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Check if provider is usable (credentials present, feature compiled in).
    async fn health_check(&self) -> bool;

    /// Get provider name for logs.
    fn name(&self) -> &str;
}

/// Create the provider a config section names.
///
/// The type is matched case-insensitively. Gemini is always available;
/// without the `gemini` feature it reports itself unhealthy, so a pipeline
/// built on it answers from the catalog.
pub fn build_provider(
    settings: &ProviderSettings,
) -> Result<Arc<dyn VisionProvider>, ProviderError> {
    match settings.provider_type.trim().to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::from_settings(&settings.settings)?)),
        other => Err(ProviderError::NotConfigured(format!(
            "Unknown provider type: '{other}'. Available: {}",
            PROVIDER_TYPES.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_gemini_from_settings() {
        let settings =
            ProviderSettings::new(" Gemini ").with_settings(json!({ "api_key": "AIza-test" }));
        let provider = build_provider(&settings).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_build_unknown_type_lists_available() {
        let err = build_provider(&ProviderSettings::new("openai")).err().unwrap();
        assert!(
            matches!(err, ProviderError::NotConfigured(ref msg) if msg.contains("openai") && msg.contains("gemini")),
            "{err}"
        );
    }

    #[test]
    fn test_build_gemini_without_key_is_not_configured() {
        let settings = ProviderSettings::new("gemini")
            .with_settings(json!({ "api_key": "" }));
        if std::env::var_os(GEMINI_API_KEY_ENV).is_none() {
            assert!(matches!(
                build_provider(&settings),
                Err(ProviderError::NotConfigured(_))
            ));
        }
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 258,
            completion_tokens: 120,
        };
        assert_eq!(usage.total(), 378);
    }

    #[test]
    fn test_completion_defaults() {
        let config = CompletionConfig::default();
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.model.starts_with("gemini"));
    }
}
