//! # Axum Helpers
//!
//! Shared plumbing for the HTTP surface of the optimizer service.
//!
//! ## Modules
//!
//! - **[`server`]**: router assembly (OpenAPI UI, CORS, tracing), health
//!   checks, graceful shutdown
//! - **[`errors`]**: the JSON error body every handler returns
//! - **[`extractors`]**: [`ValidatedJson`], which rejects bad bodies with
//!   that same error body
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_router, health_router, serve};
//! use core_config::{app_info, server::ServerConfig, Environment};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = ServerConfig::default();
//!     let router = create_router::<ApiDoc>(Router::new(), &config, &Environment::Development)?
//!         .merge(health_router(app_info!()));
//!     serve(router, &config).await
//! }
//! ```

pub mod errors;
pub mod extractors;
pub mod server;

pub use errors::{ErrorResponse, error_response, not_found};
pub use extractors::ValidatedJson;
pub use server::{
    HealthCheckFuture, HealthResponse, create_router, health_router, run_health_checks, serve,
    shutdown_signal,
};
