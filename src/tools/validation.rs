//! Schema-first argument validation. A tool call never executes with
//! arguments that fail its declared schema; rejection carries a field-level
//! error list rather than a generic failure.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AgentError, FieldError, Result};

const MAX_SCHEMA_ERRORS: usize = 5;

/// Validate raw arguments against a tool's declared parameter schema,
/// collecting per-field errors.
pub fn validate_arguments(tool: &str, schema: &Value, arguments: &Value) -> Result<()> {
    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|err| {
            AgentError::Config(format!("Invalid parameter schema for tool `{tool}`: {err}"))
        })?;

    let Err(errors) = validator.validate(arguments) else {
        return Ok(());
    };

    let mut field_errors = Vec::new();
    for error in errors.take(MAX_SCHEMA_ERRORS) {
        let field = match &error.kind {
            ValidationErrorKind::Required { property } => property
                .as_str()
                .map(|p| p.to_string())
                .unwrap_or_else(|| property.to_string()),
            _ => {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path.trim_start_matches('/').replace('/', ".")
                }
            }
        };
        field_errors.push(FieldError::new(field, error.to_string()));
    }

    Err(AgentError::validation(tool, field_errors))
}

/// Typed parse after schema validation, with the failing field path preserved
pub fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T> {
    serde_path_to_error::deserialize(arguments).map_err(|err| {
        let field = err.path().to_string();
        let field = if field.is_empty() || field == "." {
            "<root>".to_string()
        } else {
            field
        };
        AgentError::validation(tool, vec![FieldError::new(field, err.inner().to_string())])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn duration_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "timing": {"type": "string", "enum": ["outbound", "return"]},
                "duration": {"type": "integer", "minimum": 1, "maximum": 4}
            },
            "required": ["timing", "duration"]
        })
    }

    #[test]
    fn out_of_range_duration_names_the_field() {
        let err = validate_arguments(
            "selectTimingAndDuration",
            &duration_schema(),
            &json!({"timing": "outbound", "duration": 5}),
        )
        .unwrap_err();

        match err {
            AgentError::Validation { tool, errors } => {
                assert_eq!(tool, "selectTimingAndDuration");
                assert_eq!(errors[0].field, "duration");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_required_field_is_reported_by_name() {
        let err = validate_arguments(
            "selectTimingAndDuration",
            &duration_schema(),
            &json!({"timing": "outbound"}),
        )
        .unwrap_err();

        match err {
            AgentError::Validation { errors, .. } => {
                assert_eq!(errors[0].field, "duration");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_arguments_pass() {
        assert!(validate_arguments(
            "selectTimingAndDuration",
            &duration_schema(),
            &json!({"timing": "return", "duration": 3}),
        )
        .is_ok());
    }
}
