use async_trait::async_trait;
use thiserror::Error;

use crate::request::GenerationRequest;

/// Failure reported by a model client, before classification
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The service refused the credential (401/403 or an API key reason)
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success status
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection, TLS or body transfer failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Success status with a body that is not the expected envelope
    #[error("malformed model reply: {0}")]
    Decode(String),

    /// The prompt was blocked by the service's safety filters
    #[error("prompt blocked: {0}")]
    Blocked(String),
}

/// Trait for structured-output text generation backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, used for logging
    fn model_name(&self) -> String;

    /// Issue exactly one generation call and return the concatenated reply
    /// text. An empty string means the service produced no candidates.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;
}
