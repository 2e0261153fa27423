//! Server infrastructure module.
//!
//! This module provides:
//! - Router assembly with OpenAPI documentation, CORS and request tracing
//! - Health and readiness endpoints
//! - Graceful shutdown that drains in-flight requests

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_router, serve};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::shutdown_signal;
