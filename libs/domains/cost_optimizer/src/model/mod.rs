mod gemini;
mod provider;

pub use gemini::{GeminiClient, GeminiConfig};
pub use provider::{GenerativeModel, ModelError};

#[cfg(test)]
pub use provider::MockGenerativeModel;
