//! Plain-text rendering of reports for the terminal

use domain_cost_optimizer::{CredentialStatus, OptimizationReport};

pub fn render_report(report: &OptimizationReport) -> String {
    let mut out = format!(
        "Total Estimated Monthly Savings: {}\n",
        report.formatted_total
    );

    if report.is_empty() {
        out.push_str("No optimization opportunities found.\n");
        return out;
    }

    for card in &report.cards {
        out.push_str(&format!(
            "\n{} [{}]\n  Issue: {}\n  Recommendation: {}\n  Est. Monthly Savings: {}\n",
            card.resource_id, card.confidence, card.issue, card.recommendation, card.savings
        ));
    }

    out
}

pub fn render_credential(status: &CredentialStatus) -> String {
    match &status.hint {
        Some(hint) if status.configured => {
            format!("API key configured ({}, source: {})", hint, status.source)
        }
        _ => format!("No API key configured (source: {})", status.source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_cost_optimizer::{Confidence, CredentialSource, OptimizationRecommendation};
    use domain_cost_optimizer::response::build_report;

    #[test]
    fn test_render_cards_and_total() {
        let report = build_report(vec![
            OptimizationRecommendation {
                resource_id: "x".to_string(),
                issue: "Idle".to_string(),
                recommendation: "Downsize".to_string(),
                estimated_monthly_savings: 12.5,
                confidence: Confidence::High,
            },
            OptimizationRecommendation {
                resource_id: "y".to_string(),
                issue: "Over-provisioned CPU".to_string(),
                recommendation: "Move to t3.small".to_string(),
                estimated_monthly_savings: 30.0,
                confidence: Confidence::Medium,
            },
        ]);

        let text = render_report(&report);
        assert!(text.starts_with("Total Estimated Monthly Savings: $42.50\n"));
        assert!(text.contains("x [HIGH]"));
        assert!(text.contains("y [MEDIUM]"));
        assert!(text.contains("Est. Monthly Savings: $12.50"));
        assert!(text.find("x [HIGH]") < text.find("y [MEDIUM]"));
    }

    #[test]
    fn test_render_empty_report() {
        let text = render_report(&build_report(Vec::new()));
        assert!(text.contains("No optimization opportunities found."));
        assert!(text.contains("$0.00"));
    }

    #[test]
    fn test_render_credential() {
        let configured = CredentialStatus {
            configured: true,
            source: CredentialSource::Preference,
            hint: Some("****abcd".to_string()),
        };
        assert_eq!(
            render_credential(&configured),
            "API key configured (****abcd, source: preference)"
        );

        let missing = CredentialStatus {
            configured: false,
            source: CredentialSource::Environment,
            hint: None,
        };
        assert_eq!(
            render_credential(&missing),
            "No API key configured (source: environment)"
        );
    }
}
