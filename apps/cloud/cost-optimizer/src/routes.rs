//! API routes module

use axum::{Router, extract::State, response::Response, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use domain_cost_optimizer::{
    AnalysisService, CredentialProvider, GenerativeModel, ReportState, handlers,
};
use std::sync::Arc;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes<M: GenerativeModel + 'static>(
    service: Arc<AnalysisService<M>>,
    reports: Arc<ReportState>,
) -> Router {
    Router::new().nest("/optimizer", handlers::router(service, reports))
}

/// Readiness endpoint: ready once an API key is available
pub fn ready_router(credentials: Arc<CredentialProvider>) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(credentials)
}

async fn ready_handler(State(credentials): State<Arc<CredentialProvider>>) -> Response {
    let check: HealthCheckFuture<'_> =
        Box::pin(async move { handlers::credential_ready(&credentials) });
    run_health_checks(vec![("credential", check)]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain_cost_optimizer::InMemoryStore;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn ready(credentials: CredentialProvider) -> (StatusCode, Value) {
        let response = ready_router(Arc::new(credentials))
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ready_with_key() {
        let (status, body) = ready(CredentialProvider::from_environment(Some(
            "AIzaSyReady".to_string(),
        )))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["credential"], "ok");
    }

    #[tokio::test]
    async fn test_not_ready_without_key() {
        let provider = CredentialProvider::from_preference(Arc::new(InMemoryStore::new())).unwrap();
        let (status, body) = ready(provider).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
    }
}
