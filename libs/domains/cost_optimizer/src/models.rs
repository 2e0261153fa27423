use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

/// Kind of cloud resource being analyzed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Vm,
    Database,
    StorageBucket,
    LoadBalancer,
}

/// One cloud infrastructure entity with optional utilization telemetry.
///
/// Only used for strict input validation and the sample data set; the
/// pipeline itself forwards the caller's JSON untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloudResource {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[validate(length(min = 1))]
    pub region: String,
    /// Shape or tier label, e.g. `t2.micro`, `db.r5.large`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Average over the last 30 days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub cpu_usage_percent: Option<f64>,
    /// Average over the last 30 days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub memory_usage_percent: Option<f64>,
    /// Per month
    #[serde(
        default,
        rename = "networkTrafficGB",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(range(min = 0.0))]
    pub network_traffic_gb: Option<f64>,
    /// Average over the last 30 days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 24.0))]
    pub idle_hours_per_day: Option<f64>,
}

/// Confidence tier attached to a recommendation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Visual tone of a confidence badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConfidenceTone {
    Positive,
    Caution,
    Info,
}

impl Confidence {
    pub fn tone(self) -> ConfidenceTone {
        match self {
            Confidence::High => ConfidenceTone::Positive,
            Confidence::Medium => ConfidenceTone::Caution,
            Confidence::Low => ConfidenceTone::Info,
        }
    }
}

/// One structured suggestion returned by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecommendation {
    /// Expected to reference an input `id`; not verified
    pub resource_id: String,
    pub issue: String,
    pub recommendation: String,
    /// USD per month; sign is not checked
    pub estimated_monthly_savings: f64,
    pub confidence: Confidence,
}

/// Display record for one recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCard {
    pub resource_id: String,
    pub issue: String,
    pub recommendation: String,
    pub confidence: Confidence,
    pub confidence_tone: ConfidenceTone,
    /// Savings formatted as `$x.yy`
    pub savings: String,
}

impl From<&OptimizationRecommendation> for RecommendationCard {
    fn from(item: &OptimizationRecommendation) -> Self {
        Self {
            resource_id: item.resource_id.clone(),
            issue: item.issue.clone(),
            recommendation: item.recommendation.clone(),
            confidence: item.confidence,
            confidence_tone: item.confidence.tone(),
            savings: format_currency(item.estimated_monthly_savings),
        }
    }
}

/// Result of one analysis cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReport {
    /// Exactly the array returned by the model, in order
    pub recommendations: Vec<OptimizationRecommendation>,
    pub total_savings: f64,
    pub formatted_total: String,
    pub cards: Vec<RecommendationCard>,
    pub generated_at: DateTime<Utc>,
}

impl OptimizationReport {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

/// Where the API credential comes from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CredentialSource {
    /// Stored preference, changeable at runtime
    #[default]
    Preference,
    /// `GEMINI_API_KEY`, read once at startup
    Environment,
}

/// Credential state exposed to callers; never contains the key itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub configured: bool,
    pub source: CredentialSource,
    /// Masked key, e.g. `****3xYz`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// DTO for setting the stored credential. A blank key clears it.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetCredential {
    #[validate(length(max = 256))]
    pub api_key: String,
}

/// Error shown in place of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorView {
    pub kind: String,
    pub message: String,
}

impl From<&crate::error::OptimizerError> for ErrorView {
    fn from(err: &crate::error::OptimizerError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.user_message(),
        }
    }
}

/// Current contents of the report state slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub loading: bool,
    /// Ticket of the invocation whose outcome is displayed
    pub displayed_ticket: Option<u64>,
    pub report: Option<OptimizationReport>,
    pub error: Option<ErrorView>,
}

/// Format a USD amount with two decimals
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}
