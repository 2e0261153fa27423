use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::classify::classify;
use crate::credentials::CredentialProvider;
use crate::error::OptimizerResult;
use crate::model::GenerativeModel;
use crate::models::OptimizationReport;
use crate::request::RequestBuilder;
use crate::response::{build_report, parse_recommendations};
use crate::state::ReportState;
use crate::validation::{ValidationMode, validate_input};

/// Drives one analysis cycle: validate, build request, call model, aggregate
pub struct AnalysisService<M: GenerativeModel> {
    model: Arc<M>,
    credentials: Arc<CredentialProvider>,
    requests: RequestBuilder,
    validation: ValidationMode,
}

impl<M: GenerativeModel> AnalysisService<M> {
    pub fn new(model: M, credentials: Arc<CredentialProvider>) -> Self {
        Self {
            model: Arc::new(model),
            credentials,
            requests: RequestBuilder::default(),
            validation: ValidationMode::default(),
        }
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    pub fn with_request_builder(mut self, requests: RequestBuilder) -> Self {
        self.requests = requests;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    /// Run the full pipeline on raw input text.
    ///
    /// Input problems and a missing credential are reported before any
    /// network call. At most one call is made to the model.
    #[instrument(skip(self, raw), fields(invocation_id = %Uuid::now_v7()))]
    pub async fn analyze(&self, raw: &str) -> OptimizerResult<OptimizationReport> {
        let resources = validate_input(raw, self.validation).inspect_err(|e| {
            tracing::info!(kind = e.kind(), "Rejected analysis input");
        })?;

        let api_key = self.credentials.current();
        let request = self.requests.build(&resources, api_key.as_ref())?;

        tracing::info!(resources = request.resource_count, "Requesting recommendations");

        let reply = self.model.generate(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "Model call failed");
            classify(e)
        })?;

        let recommendations = parse_recommendations(&reply).inspect_err(|e| {
            tracing::warn!(error = %e, "Model reply rejected");
        })?;
        let report = build_report(recommendations);

        tracing::info!(
            recommendations = report.recommendations.len(),
            total = %report.formatted_total,
            "Analysis complete"
        );

        Ok(report)
    }

    /// Run [`Self::analyze`] and publish the outcome to the report state.
    ///
    /// If the returned future is dropped mid-flight the invocation is
    /// published as failed instead of leaving the state loading.
    pub async fn analyze_tracked(
        &self,
        raw: &str,
        state: &ReportState,
    ) -> OptimizerResult<OptimizationReport> {
        let pending = state.track();
        let outcome = self.analyze(raw).await;
        pending.finish(&outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{InMemoryStore, KeyValueStore};
    use crate::error::OptimizerError;
    use crate::model::{MockGenerativeModel, ModelError};
    use crate::models::Confidence;

    const SCENARIO_INPUT: &str = r#"[{"id":"x","type":"VM","cpuUsagePercent":2}]"#;
    const SCENARIO_REPLY: &str = r#"[{"resourceId":"x","issue":"Idle","recommendation":"Downsize","estimatedMonthlySavings":12.5,"confidence":"HIGH"}]"#;

    fn credentials_with_key() -> Arc<CredentialProvider> {
        Arc::new(CredentialProvider::from_environment(Some(
            "AIzaSyTestKey0000".to_string(),
        )))
    }

    fn credentials_without_key() -> Arc<CredentialProvider> {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        Arc::new(CredentialProvider::from_preference(store).unwrap())
    }

    #[tokio::test]
    async fn test_scenario_single_card() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .withf(|req| {
                req.api_key.expose() == "AIzaSyTestKey0000"
                    && req.resource_count == 1
                    && req.prompt.contains("\"cpuUsagePercent\": 2")
            })
            .times(1)
            .returning(|_| Ok(SCENARIO_REPLY.to_string()));

        let service = AnalysisService::new(model, credentials_with_key());
        let report = service.analyze(SCENARIO_INPUT).await.unwrap();

        assert_eq!(report.cards.len(), 1);
        assert_eq!(report.cards[0].resource_id, "x");
        assert_eq!(report.recommendations[0].confidence, Confidence::High);
        assert_eq!(report.formatted_total, "$12.50");
    }

    #[tokio::test]
    async fn test_not_json_never_reaches_model() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate().never();

        let service = AnalysisService::new(model, credentials_with_key());
        let err = service.analyze("not json").await.unwrap_err();

        assert!(matches!(err, OptimizerError::Parse(_)));
        assert_eq!(
            err.user_message(),
            "Invalid JSON format. Please check the structure and try again."
        );
    }

    #[tokio::test]
    async fn test_missing_credential_never_reaches_model() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate().never();

        let service = AnalysisService::new(model, credentials_without_key());
        let err = service.analyze(SCENARIO_INPUT).await.unwrap_err();

        assert_eq!(err, OptimizerError::MissingCredential);
    }

    #[tokio::test]
    async fn test_shape_error_wins_over_missing_credential() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate().never();

        let service = AnalysisService::new(model, credentials_without_key());
        let err = service.analyze("[]").await.unwrap_err();

        assert!(matches!(err, OptimizerError::Shape(_)));
    }

    #[tokio::test]
    async fn test_rejected_credential_is_classified() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate().times(1).returning(|_| {
            Err(ModelError::Unauthorized {
                status: 400,
                message: "API key not valid. Please pass a valid API key.".to_string(),
            })
        });

        let service = AnalysisService::new(model, credentials_with_key());
        let err = service.analyze(SCENARIO_INPUT).await.unwrap_err();

        assert!(matches!(err, OptimizerError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .times(1)
            .returning(|_| Err(ModelError::Transport("connection reset".to_string())));

        let service = AnalysisService::new(model, credentials_with_key());
        let err = service.analyze(SCENARIO_INPUT).await.unwrap_err();

        assert!(matches!(err, OptimizerError::AnalysisFailed(_)));
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_report() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .returning(|_| Ok("  ".to_string()));

        let service = AnalysisService::new(model, credentials_with_key());
        let report = service.analyze(SCENARIO_INPUT).await.unwrap();

        assert!(report.is_empty());
        assert_eq!(report.formatted_total, "$0.00");
    }

    #[tokio::test]
    async fn test_malformed_reply_is_invalid_response() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .returning(|_| Ok("Sure! Here are some ideas".to_string()));

        let service = AnalysisService::new(model, credentials_with_key());
        let err = service.analyze(SCENARIO_INPUT).await.unwrap_err();

        assert!(matches!(err, OptimizerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_strict_mode_blocks_malformed_elements() {
        let mut model = MockGenerativeModel::new();
        model.expect_generate().never();

        let service = AnalysisService::new(model, credentials_with_key())
            .with_validation_mode(ValidationMode::Strict);
        let err = service.analyze(SCENARIO_INPUT).await.unwrap_err();

        // scenario input has no region
        assert!(matches!(err, OptimizerError::Shape(_)));
    }

    #[tokio::test]
    async fn test_custom_temperature_is_forwarded() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .withf(|req| req.temperature == 0.7)
            .times(1)
            .returning(|_| Ok("[]".to_string()));

        let service = AnalysisService::new(model, credentials_with_key())
            .with_request_builder(RequestBuilder::new(0.7));
        service.analyze(SCENARIO_INPUT).await.unwrap();
    }

    #[tokio::test]
    async fn test_analyze_tracked_publishes_outcome() {
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate()
            .returning(|_| Ok(SCENARIO_REPLY.to_string()));

        let service = AnalysisService::new(model, credentials_with_key());
        let state = ReportState::default();

        service.analyze_tracked(SCENARIO_INPUT, &state).await.unwrap();
        let snapshot = state.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.report.unwrap().formatted_total, "$12.50");

        service.analyze_tracked("{}", &state).await.unwrap_err();
        let snapshot = state.snapshot();
        assert!(snapshot.report.is_none());
        assert_eq!(snapshot.error.unwrap().kind, "ShapeError");
    }
}
