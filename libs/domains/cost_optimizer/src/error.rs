use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::ErrorResponse;
use serde_json::json;
use thiserror::Error;

/// Result type for optimizer operations
pub type OptimizerResult<T> = Result<T, OptimizerError>;

/// Every way an analysis cycle (or a credential change) can fail.
///
/// Each pipeline stage maps its failure to exactly one variant; there are
/// no partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// Input text is not well-formed JSON
    #[error("Invalid JSON format: {0}")]
    Parse(String),

    /// Input is JSON but not a non-empty array of resources
    #[error("Invalid resource data: {0}")]
    Shape(String),

    /// No credential available before dispatch
    #[error("API key is not configured")]
    MissingCredential,

    /// The model service rejected the credential
    #[error("API key rejected by the model service: {0}")]
    InvalidCredential(String),

    /// Model reply is not schema-conformant JSON
    #[error("Model response does not match the recommendation schema: {0}")]
    InvalidResponse(String),

    /// Any other model or network failure
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Preference store could not be read or written
    #[error("Preference store error: {0}")]
    Store(String),

    /// Credential comes from the environment and is read-only
    #[error("API key is managed by the environment and cannot be changed at runtime")]
    CredentialLocked,
}

impl OptimizerError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "ParseError",
            Self::Shape(_) => "ShapeError",
            Self::MissingCredential => "MissingCredentialError",
            Self::InvalidCredential(_) => "InvalidCredentialError",
            Self::InvalidResponse(_) => "InvalidResponseError",
            Self::AnalysisFailed(_) => "AnalysisFailedError",
            Self::Store(_) => "StoreError",
            Self::CredentialLocked => "CredentialLockedError",
        }
    }

    /// Message shown in place of the report
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(_) => {
                "Invalid JSON format. Please check the structure and try again.".to_string()
            }
            Self::Shape(_) => self.to_string(),
            Self::MissingCredential => {
                "Please set your API Key before analyzing resources.".to_string()
            }
            Self::InvalidCredential(_) => {
                "The provided API Key is not valid. Please check your key and try again."
                    .to_string()
            }
            Self::InvalidResponse(_) => {
                "The AI returned recommendations in an unexpected format. Please try again."
                    .to_string()
            }
            Self::AnalysisFailed(_) => "Failed to get optimization recommendations from the AI. \
                 This could be due to an invalid API key or a network issue."
                .to_string(),
            Self::Store(_) => "Could not access the saved preferences.".to_string(),
            Self::CredentialLocked => self.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Parse(_) | Self::Shape(_) | Self::MissingCredential => StatusCode::BAD_REQUEST,
            Self::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidResponse(_) | Self::AnalysisFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CredentialLocked => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for OptimizerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = ErrorResponse::new(status, self.kind(), self.user_message());

        // Only input and schema failures carry details
        match &self {
            Self::Parse(reason) | Self::Shape(reason) | Self::InvalidResponse(reason) => {
                body = body.with_details(json!({ "reason": reason }));
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}
