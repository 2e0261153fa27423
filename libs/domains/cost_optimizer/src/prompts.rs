//! Prompt template and response schema for the analysis request

use serde_json::{Value, json};

/// Task description sent ahead of the resource data
pub const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze the following JSON array of cloud resources. Identify opportunities for cost savings and provide actionable recommendations.
Focus on:
1.  Idle Resources: High idleHoursPerDay.
2.  Over-provisioned Resources: Low cpuUsagePercent or memoryUsagePercent. Suggest downsizing.
3.  Wrong Service Tiers: Consider if a different storage class or database type would be cheaper for the given usage."#;

/// Render the full prompt with the resources pretty-printed (2-space indent).
pub fn render_prompt(resources: &[Value]) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(resources)?;
    Ok(format!(
        "{}\n\nResource Data:\n{}\n",
        ANALYSIS_INSTRUCTIONS, data
    ))
}

/// Schema the model's JSON reply must conform to.
///
/// Uses the uppercase OpenAPI subset understood by `generateContent`.
pub fn recommendation_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "resourceId": {
                    "type": "STRING",
                    "description": "The ID of the cloud resource being analyzed."
                },
                "issue": {
                    "type": "STRING",
                    "description": "A concise description of the identified inefficiency or waste (e.g., 'Over-provisioned CPU', 'Idle Resource')."
                },
                "recommendation": {
                    "type": "STRING",
                    "description": "The specific, actionable recommendation to optimize the resource (e.g., 'Downsize instance to t2.small', 'Enable auto-shutdown during non-business hours')."
                },
                "estimatedMonthlySavings": {
                    "type": "NUMBER",
                    "description": "The estimated cost savings in USD per month if the recommendation is implemented."
                },
                "confidence": {
                    "type": "STRING",
                    "enum": ["HIGH", "MEDIUM", "LOW"],
                    "description": "The confidence level of this recommendation."
                }
            },
            "required": [
                "resourceId",
                "issue",
                "recommendation",
                "estimatedMonthlySavings",
                "confidence"
            ]
        }
    })
}
