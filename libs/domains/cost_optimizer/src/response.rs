//! Response validation and aggregation.

use chrono::Utc;

use crate::error::{OptimizerError, OptimizerResult};
use crate::models::{
    OptimizationRecommendation, OptimizationReport, RecommendationCard, format_currency,
};

/// Parse the model's reply text.
///
/// Blank text means zero recommendations. Anything else must be a JSON array
/// of complete recommendation objects; a `confidence` outside
/// HIGH/MEDIUM/LOW is rejected.
pub fn parse_recommendations(raw: &str) -> OptimizerResult<Vec<OptimizationRecommendation>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(trimmed).map_err(|e| OptimizerError::InvalidResponse(e.to_string()))
}

/// Plain floating-point sum, in order. An empty list totals `+0.0`.
pub fn total_savings(recommendations: &[OptimizationRecommendation]) -> f64 {
    recommendations
        .iter()
        .fold(0.0, |acc, r| acc + r.estimated_monthly_savings)
}

pub fn build_report(recommendations: Vec<OptimizationRecommendation>) -> OptimizationReport {
    let total = total_savings(&recommendations);
    let cards = recommendations.iter().map(RecommendationCard::from).collect();

    OptimizationReport {
        recommendations,
        total_savings: total,
        formatted_total: format_currency(total),
        cards,
        generated_at: Utc::now(),
    }
}
