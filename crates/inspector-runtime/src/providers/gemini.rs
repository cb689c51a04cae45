//! Google Gemini vision provider.
//!
//! Sends one `generateContent` request carrying the instruction text and
//! the image as inline base64 data, with JSON output requested through
//! `generationConfig`.
//!
//! ## Security
//!
//! The API key is held in an [`ApiCredential`] and sent in the
//! `x-goog-api-key` header, never in the URL, so it cannot leak through
//! request logs or error messages that echo the URL.

use super::{
    secrets::ApiCredential, CompletionConfig, CompletionResponse, ProviderError, TokenUsage,
    VisionProvider, VisionRequest,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Environment variable name for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini multimodal provider.
pub struct GeminiProvider {
    credential: ApiCredential,
    base_url: String,
    #[cfg(feature = "gemini")]
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider with an explicit API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::from(api_key.into()))
    }

    /// Create from provider settings, falling back to `GEMINI_API_KEY`.
    ///
    /// ```yaml
    /// api_key: AIza...                  # optional, else GEMINI_API_KEY
    /// base_url: http://localhost:8080   # optional, must be http(s)
    /// ```
    pub fn from_settings(settings: &JsonValue) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_config_or_env(settings, "api_key", GEMINI_API_KEY_ENV)?;

        let mut provider = Self::with_credential(credential);
        if let Some(url) = settings.get("base_url").and_then(JsonValue::as_str) {
            let url = url.trim();
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProviderError::NotConfigured(format!(
                    "Gemini base_url must start with http:// or https://, got '{url}'"
                )));
            }
            provider = provider.with_base_url(url);
        }
        Ok(provider)
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            #[cfg(feature = "gemini")]
            client: reqwest::Client::new(),
        }
    }

    #[cfg_attr(not(feature = "gemini"), allow(dead_code))]
    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<JsonValue>,
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn build_request(request: VisionRequest, config: &CompletionConfig) -> GeminiRequest {
    GeminiRequest {
        system_instruction: request.system.map(|text| Content {
            role: None,
            parts: vec![Part::Text { text }],
        }),
        contents: vec![Content {
            role: Some("user"),
            parts: vec![
                Part::Text {
                    text: request.instruction,
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: request.image.mime_type,
                        data: request.image.data,
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: request.response_schema,
            temperature: config.temperature,
            max_output_tokens: config.max_tokens,
        },
    }
}

#[cfg_attr(not(feature = "gemini"), allow(dead_code))]
fn into_completion(
    body: GeminiResponse,
    requested_model: &str,
) -> Result<CompletionResponse, ProviderError> {
    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ParseError("Response has no candidates".to_string()))?;

    let content = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let usage = body.usage_metadata.unwrap_or_default();

    Ok(CompletionResponse {
        content,
        usage: TokenUsage {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
        },
        model: body
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
        finish_reason: candidate.finish_reason,
    })
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    #[cfg(feature = "gemini")]
    async fn complete(
        &self,
        request: VisionRequest,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        use std::time::Duration;

        let body = build_request(request, config);

        // SECURITY: Only expose the credential here, at the point of use
        let response = self
            .client
            .post(self.endpoint(&config.model))
            .header("x-goog-api-key", self.credential.expose())
            .timeout(config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.without_url().to_string())
                }
            })?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        into_completion(body, &config.model)
    }

    #[cfg(not(feature = "gemini"))]
    async fn complete(
        &self,
        _request: VisionRequest,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "Gemini provider requires 'gemini' feature".to_string(),
        ))
    }

    async fn health_check(&self) -> bool {
        cfg!(feature = "gemini") && !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
