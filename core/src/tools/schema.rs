//! Argument validation against the catalog's JSON-schema-like descriptors
//!
//! Only the subset the catalog actually uses is checked: top-level object
//! shape, `required` fields, per-property scalar `type`, and `enum`.

use crate::error::ToolError;
use serde_json::Value;

/// Validate tool-call arguments against a parameter schema. A mismatch is a
/// `Validation` error surfaced to the model as that tool's failed result.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> Result<(), ToolError> {
    let args = arguments.as_object().ok_or_else(|| ToolError::Validation {
        message: "arguments must be a JSON object".to_string(),
    })?;

    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            let missing = match args.get(field) {
                None | Some(Value::Null) => true,
                _ => false,
            };
            if missing {
                return Err(ToolError::Validation {
                    message: format!("missing required argument: {}", field),
                });
            }
        }
    }

    for (key, value) in args {
        let Some(property) = properties.get(key) else {
            // Unknown extra arguments are tolerated; the model frequently
            // volunteers them and handlers ignore what they don't read.
            continue;
        };

        if let Some(expected) = property.get("type").and_then(Value::as_str) {
            if !matches_type(value, expected) {
                return Err(ToolError::Validation {
                    message: format!("argument '{}' must be of type {}", key, expected),
                });
            }
        }

        if let Some(allowed) = property.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(ToolError::Validation {
                    message: format!(
                        "argument '{}' must be one of {}",
                        key,
                        serde_json::to_string(allowed).unwrap_or_default()
                    ),
                });
            }
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}
