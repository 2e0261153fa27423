//! Reclassification of model client failures into user-facing error kinds.
//!
//! Structured signals from the client win. Substring matching on the error
//! text is only a fallback for transports that hide the status.

use crate::error::OptimizerError;
use crate::model::ModelError;

const CREDENTIAL_MARKERS: [&str; 2] = ["API key not valid", "API_KEY_INVALID"];

fn mentions_bad_credential(message: &str) -> bool {
    CREDENTIAL_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Bad credential vs. everything else
pub fn classify(err: ModelError) -> OptimizerError {
    match err {
        ModelError::Unauthorized { message, .. } => OptimizerError::InvalidCredential(message),
        ModelError::Api { message, .. } | ModelError::Transport(message)
            if mentions_bad_credential(&message) =>
        {
            OptimizerError::InvalidCredential(message)
        }
        other => OptimizerError::AnalysisFailed(other.to_string()),
    }
}
