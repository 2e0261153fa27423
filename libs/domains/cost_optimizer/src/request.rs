//! Request stage: turns validated resources plus a credential into one
//! outbound generation request.

use serde_json::Value;

use crate::credentials::ApiKey;
use crate::error::{OptimizerError, OptimizerResult};
use crate::prompts::{recommendation_schema, render_prompt};

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// MIME type that switches the model into structured JSON output
pub const JSON_MIME_TYPE: &str = "application/json";

/// Everything the model client needs for one call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub api_key: ApiKey,
    pub prompt: String,
    pub response_mime_type: &'static str,
    pub response_schema: Value,
    pub temperature: f32,
    /// Number of resource records embedded in the prompt
    pub resource_count: usize,
}

/// Builds [`GenerationRequest`]s with a fixed sampling configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestBuilder {
    temperature: f32,
}

impl RequestBuilder {
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Assemble the request, failing before any network activity when no
    /// credential is available.
    pub fn build(
        &self,
        resources: &[Value],
        api_key: Option<&ApiKey>,
    ) -> OptimizerResult<GenerationRequest> {
        let api_key = api_key.cloned().ok_or(OptimizerError::MissingCredential)?;

        let prompt = render_prompt(resources)
            .map_err(|e| OptimizerError::Shape(format!("resources could not be rendered: {}", e)))?;

        Ok(GenerationRequest {
            api_key,
            prompt,
            response_mime_type: JSON_MIME_TYPE,
            response_schema: recommendation_schema(),
            temperature: self.temperature,
            resource_count: resources.len(),
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE)
    }
}
