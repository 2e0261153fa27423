//! Input validation stage.
//!
//! Turns raw user text into the ordered list of resource records that is
//! forwarded to the model. Records are kept as raw JSON values so unknown
//! fields, key order and number formatting reach the prompt unchanged.

use serde_json::Value;
use strum::{Display, EnumString};
use validator::Validate;

use crate::error::{OptimizerError, OptimizerResult};
use crate::models::CloudResource;

/// How much of each record is checked before forwarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ValidationMode {
    /// Only the outer shape: a non-empty JSON array
    #[default]
    Permissive,
    /// Every element must be a well-formed `CloudResource`
    Strict,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse and validate raw input text.
///
/// Fails with [`OptimizerError::Parse`] for text that is not JSON and with
/// [`OptimizerError::Shape`] for anything other than a non-empty array (or,
/// in strict mode, for the first malformed element).
pub fn validate_input(raw: &str, mode: ValidationMode) -> OptimizerResult<Vec<Value>> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| OptimizerError::Parse(e.to_string()))?;

    let resources = match parsed {
        Value::Array(items) if items.is_empty() => {
            return Err(OptimizerError::Shape(
                "input must be a non-empty array of cloud resources (got an empty array)"
                    .to_string(),
            ));
        }
        Value::Array(items) => items,
        other => {
            return Err(OptimizerError::Shape(format!(
                "input must be a non-empty array of cloud resources (got {})",
                json_kind(&other)
            )));
        }
    };

    if mode == ValidationMode::Strict {
        for (index, item) in resources.iter().enumerate() {
            check_resource(index, item)?;
        }
    }

    Ok(resources)
}

fn check_resource(index: usize, item: &Value) -> OptimizerResult<()> {
    let resource: CloudResource = serde_json::from_value(item.clone())
        .map_err(|e| OptimizerError::Shape(format!("resource at index {}: {}", index, e)))?;

    resource
        .validate()
        .map_err(|e| OptimizerError::Shape(format!("resource at index {}: {}", index, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_array_unchanged_and_in_order() {
        let raw = r#"[
            {"id": "b", "type": "VM", "region": "us-east-1", "custom": {"team": "web"}},
            {"id": "a", "type": "SPACESHIP"},
            {"id": "b", "type": "VM", "region": "us-east-1"}
        ]"#;

        let resources = validate_input(raw, ValidationMode::Permissive).unwrap();

        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0]["id"], "b");
        assert_eq!(resources[0]["custom"]["team"], "web");
        assert_eq!(resources[1], json!({"id": "a", "type": "SPACESHIP"}));
        assert_eq!(resources[2]["id"], "b");
    }

    #[test]
    fn test_preserves_key_order() {
        let raw = r#"[{"region": "us-east-1", "id": "x", "type": "VM"}]"#;
        let resources = validate_input(raw, ValidationMode::Permissive).unwrap();

        let keys: Vec<_> = resources[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["region", "id", "type"]);
    }

    #[test]
    fn test_rejects_non_json_with_parse_error() {
        for raw in ["not json", "", "[{\"id\": }]", "{"] {
            let err = validate_input(raw, ValidationMode::Permissive).unwrap_err();
            assert!(
                matches!(err, OptimizerError::Parse(_)),
                "expected parse error for {:?}, got {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_rejects_non_array_with_shape_error() {
        for raw in [r#"{"id": "x"}"#, "42", "\"text\"", "null", "true"] {
            let err = validate_input(raw, ValidationMode::Permissive).unwrap_err();
            assert!(matches!(err, OptimizerError::Shape(_)), "{:?}", raw);
        }
    }

    #[test]
    fn test_rejects_empty_array_with_shape_error() {
        let err = validate_input("  [ ]  ", ValidationMode::Permissive).unwrap_err();
        match err {
            OptimizerError::Shape(reason) => assert!(reason.contains("empty array")),
            other => panic!("expected shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_accepts_well_formed_resources() {
        let raw = r#"[
            {"id": "x", "type": "VM", "region": "us-east-1", "cpuUsagePercent": 2},
            {"id": "y", "type": "STORAGE_BUCKET", "region": "us-east-1", "networkTrafficGB": 40}
        ]"#;

        let resources = validate_input(raw, ValidationMode::Strict).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0]["cpuUsagePercent"], 2);
    }

    #[test]
    fn test_strict_mode_names_offending_element() {
        let raw = r#"[
            {"id": "x", "type": "VM", "region": "us-east-1"},
            {"id": "y", "type": "VM", "region": "us-east-1", "cpuUsagePercent": 180}
        ]"#;

        match validate_input(raw, ValidationMode::Strict).unwrap_err() {
            OptimizerError::Shape(reason) => assert!(reason.contains("index 1"), "{}", reason),
            other => panic!("expected shape error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_rejects_unknown_type_and_missing_fields() {
        let unknown = r#"[{"id": "x", "type": "SPACESHIP", "region": "us-east-1"}]"#;
        assert!(matches!(
            validate_input(unknown, ValidationMode::Strict),
            Err(OptimizerError::Shape(_))
        ));

        let missing_region = r#"[{"id": "x", "type": "VM"}]"#;
        assert!(matches!(
            validate_input(missing_region, ValidationMode::Strict),
            Err(OptimizerError::Shape(_))
        ));

        let blank_id = r#"[{"id": "", "type": "VM", "region": "us-east-1"}]"#;
        assert!(matches!(
            validate_input(blank_id, ValidationMode::Strict),
            Err(OptimizerError::Shape(_))
        ));
    }
}
