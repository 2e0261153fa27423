//! Cost Optimizer Domain
//!
//! Turns a JSON description of cloud resources into cost-saving
//! recommendations produced by an external generative model.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← HTTP endpoints, report state
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │   Service    │  ← validate → build request → generate → aggregate
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐     ┌──────────────┐
//! │    Model     │     │ Credentials  │  ← API key + preference store
//! └──────┬───────┘     └──────────────┘
//!        │
//! ┌──────▼───────┐
//! │   Models     │  ← Resources, recommendations, report
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_cost_optimizer::{
//!     AnalysisService, CredentialProvider, FileStore, GeminiClient, GeminiConfig, ReportState,
//!     handlers,
//! };
//!
//! let store = Arc::new(FileStore::new(".cost-optimizer/preferences.json"));
//! let credentials = Arc::new(CredentialProvider::from_preference(store).unwrap());
//! let service = AnalysisService::new(GeminiClient::new(GeminiConfig::default()), credentials);
//!
//! let router = handlers::router(Arc::new(service), Arc::new(ReportState::default()));
//! ```

pub mod classify;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod model;
pub mod models;
pub mod prompts;
pub mod request;
pub mod response;
pub mod sample;
pub mod service;
pub mod state;
pub mod validation;

// Re-export commonly used types
pub use credentials::{
    API_KEY_PREFERENCE, ApiKey, CredentialProvider, FileStore, InMemoryStore, KeyValueStore,
};
pub use error::{OptimizerError, OptimizerResult};
pub use handlers::ApiDoc;
pub use model::{GeminiClient, GeminiConfig, GenerativeModel, ModelError};
pub use models::{
    CloudResource, Confidence, ConfidenceTone, CredentialSource, CredentialStatus, ErrorView,
    OptimizationRecommendation, OptimizationReport, RecommendationCard, ReportSnapshot,
    ResourceType, format_currency,
};
pub use request::{GenerationRequest, RequestBuilder};
pub use service::AnalysisService;
pub use state::{InFlight, ReportState, SupersededResults, Ticket};
pub use validation::{ValidationMode, validate_input};
