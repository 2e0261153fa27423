use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_helpers::{ErrorResponse, ValidatedJson};
use serde_json::Value;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::credentials::CredentialProvider;
use crate::error::{OptimizerError, OptimizerResult};
use crate::model::GenerativeModel;
use crate::models::{
    CloudResource, Confidence, ConfidenceTone, CredentialSource, CredentialStatus, ErrorView,
    OptimizationRecommendation, OptimizationReport, RecommendationCard, ReportSnapshot,
    ResourceType, SetCredential,
};
use crate::sample::sample_resources;
use crate::service::AnalysisService;
use crate::state::ReportState;

const TAG: &str = "Optimizer";

/// OpenAPI documentation for the optimizer API
#[derive(OpenApi)]
#[openapi(
    paths(
        analyze,
        get_report,
        get_sample,
        get_credential,
        set_credential,
        clear_credential,
    ),
    components(schemas(
        CloudResource,
        ResourceType,
        OptimizationRecommendation,
        OptimizationReport,
        RecommendationCard,
        Confidence,
        ConfidenceTone,
        ReportSnapshot,
        ErrorView,
        CredentialStatus,
        CredentialSource,
        SetCredential,
        ErrorResponse
    )),
    tags(
        (name = TAG, description = "Cloud resource cost analysis")
    )
)]
pub struct ApiDoc;

/// Shared handler state
pub struct OptimizerState<M: GenerativeModel> {
    pub service: Arc<AnalysisService<M>>,
    pub reports: Arc<ReportState>,
}

impl<M: GenerativeModel> Clone for OptimizerState<M> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            reports: Arc::clone(&self.reports),
        }
    }
}

/// Create the optimizer router with all HTTP endpoints
pub fn router<M: GenerativeModel + 'static>(
    service: Arc<AnalysisService<M>>,
    reports: Arc<ReportState>,
) -> Router {
    Router::new()
        .route("/analyze", post(analyze::<M>))
        .route("/report", get(get_report::<M>))
        .route("/sample", get(get_sample))
        .route(
            "/credential",
            get(get_credential::<M>)
                .put(set_credential::<M>)
                .delete(clear_credential::<M>),
        )
        .with_state(OptimizerState { service, reports })
}

/// Run one analysis on a raw JSON array of resources
#[utoipa::path(
    post,
    path = "/analyze",
    tag = TAG,
    request_body(
        content = Vec<CloudResource>,
        content_type = "application/json",
        description = "Raw text, expected to be a non-empty JSON array of resources"
    ),
    responses(
        (status = 200, description = "Recommendations and total", body = OptimizationReport),
        (status = 400, description = "Malformed input or no API key", body = ErrorResponse),
        (status = 401, description = "API key rejected", body = ErrorResponse),
        (status = 502, description = "Model call failed or reply was malformed", body = ErrorResponse)
    )
)]
async fn analyze<M: GenerativeModel>(
    State(state): State<OptimizerState<M>>,
    body: String,
) -> OptimizerResult<Json<OptimizationReport>> {
    let report = state.service.analyze_tracked(&body, &state.reports).await?;
    Ok(Json(report))
}

/// Current report state
#[utoipa::path(
    get,
    path = "/report",
    tag = TAG,
    responses(
        (status = 200, description = "Latest displayed outcome", body = ReportSnapshot)
    )
)]
async fn get_report<M: GenerativeModel>(
    State(state): State<OptimizerState<M>>,
) -> Json<ReportSnapshot> {
    Json(state.reports.snapshot())
}

/// Sample resource data
#[utoipa::path(
    get,
    path = "/sample",
    tag = TAG,
    responses(
        (status = 200, description = "Sample resources", body = Vec<CloudResource>)
    )
)]
async fn get_sample() -> Json<Value> {
    Json(sample_resources())
}

/// API key status
#[utoipa::path(
    get,
    path = "/credential",
    tag = TAG,
    responses(
        (status = 200, description = "Whether a key is configured", body = CredentialStatus)
    )
)]
async fn get_credential<M: GenerativeModel>(
    State(state): State<OptimizerState<M>>,
) -> Json<CredentialStatus> {
    Json(state.service.credentials().status())
}

/// Store the API key preference
#[utoipa::path(
    put,
    path = "/credential",
    tag = TAG,
    request_body = SetCredential,
    responses(
        (status = 200, description = "Key saved", body = CredentialStatus),
        (status = 400, description = "Key fails validation", body = ErrorResponse),
        (status = 422, description = "Body is not a credential object", body = ErrorResponse),
        (status = 409, description = "Key is managed by the environment", body = ErrorResponse),
        (status = 500, description = "Preferences could not be written", body = ErrorResponse)
    )
)]
async fn set_credential<M: GenerativeModel>(
    State(state): State<OptimizerState<M>>,
    ValidatedJson(input): ValidatedJson<SetCredential>,
) -> OptimizerResult<Json<CredentialStatus>> {
    let credentials = Arc::clone(state.service.credentials());
    let status = blocking(move || credentials.set(&input.api_key)).await?;
    Ok(Json(status))
}

/// Remove the API key preference
#[utoipa::path(
    delete,
    path = "/credential",
    tag = TAG,
    responses(
        (status = 200, description = "Key cleared", body = CredentialStatus),
        (status = 409, description = "Key is managed by the environment", body = ErrorResponse),
        (status = 500, description = "Preferences could not be written", body = ErrorResponse)
    )
)]
async fn clear_credential<M: GenerativeModel>(
    State(state): State<OptimizerState<M>>,
) -> OptimizerResult<Json<CredentialStatus>> {
    let credentials = Arc::clone(state.service.credentials());
    let status = blocking(move || credentials.clear()).await?;
    Ok(Json(status))
}

/// Preference writes touch the filesystem
async fn blocking<F>(f: F) -> OptimizerResult<CredentialStatus>
where
    F: FnOnce() -> OptimizerResult<CredentialStatus> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| OptimizerError::Store(e.to_string()))?
}

/// Readiness check: an API key is available
pub fn credential_ready(credentials: &CredentialProvider) -> Result<(), String> {
    if credentials.current().is_some() {
        Ok(())
    } else {
        Err(format!(
            "no API key configured (source: {})",
            credentials.source()
        ))
    }
}
