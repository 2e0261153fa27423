//! Gemini `generateContent` client
//!
//! Talks to the Generative Language REST API with an API key passed in the
//! `x-goog-api-key` header. Structured output is requested through
//! `generationConfig.responseMimeType` and `responseSchema`.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerativeModel, ModelError};
use crate::request::{DEFAULT_TEMPERATURE, GenerationRequest};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Gemini client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    /// Scheme and host, without the API version
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
}

impl GeminiConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Get the `generateContent` endpoint URL for the configured model
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl FromEnv for GeminiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let temperature = env_parse_or("GEMINI_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::ParseError {
                key: "GEMINI_TEMPERATURE".to_string(),
                details: format!("{} is outside 0.0..=2.0", temperature),
            });
        }

        Ok(Self {
            api_base: env_or_default("GEMINI_BASE_URL", DEFAULT_API_BASE),
            model: env_or_default("GEMINI_MODEL", DEFAULT_MODEL),
            temperature,
        })
    }
}

/// Gemini model client
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(GeminiConfig::from_env()?))
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

// Gemini request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

const INVALID_KEY_REASON: &str = "API_KEY_INVALID";

/// Map a non-success status and its body to a [`ModelError`].
///
/// Gemini answers a bad key with 400 and reason `API_KEY_INVALID`, so the
/// body is inspected as well as the status code.
fn error_from_status(status: u16, body: &str) -> ModelError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    let unauthorized = matches!(status, 401 | 403)
        || parsed.as_ref().is_some_and(|e| {
            matches!(
                e.error.status.as_deref(),
                Some("UNAUTHENTICATED" | "PERMISSION_DENIED")
            ) || e
                .error
                .details
                .iter()
                .any(|d| d.reason.as_deref() == Some(INVALID_KEY_REASON))
        });

    if unauthorized {
        ModelError::Unauthorized { status, message }
    } else {
        ModelError::Api { status, message }
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String, ModelError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ModelError::Blocked(reason));
    }

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> String {
        self.config.model.clone()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let endpoint = self.config.endpoint_url();

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request.response_mime_type,
                response_schema: &request.response_schema,
                temperature: request.temperature,
            },
        };

        tracing::debug!(model = %self.config.model, %endpoint, "Calling generateContent");

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", request.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Gemini API returned an error");
            return Err(error_from_status(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| ModelError::Decode(e.to_string()))?;

        extract_text(parsed)
    }
}
