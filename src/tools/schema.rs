//! Argument validation against a tool's declared JSON schema.
//!
//! Only the subset the tool schemas use is checked: top-level `type: object`,
//! `required`, per-property `type` and `enum`. A `null` field counts as absent;
//! the arguments themselves must be an object.

use crate::tools::ToolError;
use serde_json::Value;

/// Check `args` against `schema` before the tool runs.
pub fn validate_args(schema: &Value, args: &Value) -> Result<(), ToolError> {
    let object = match args {
        Value::Object(map) => map,
        other => {
            return Err(ToolError::validation(format!(
                "arguments must be a JSON object, got {}",
                json_type_name(other)
            )))
        }
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if object.get(field).map_or(true, Value::is_null) {
                return Err(ToolError::validation(format!(
                    "missing required field '{}'",
                    field
                )));
            }
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (field, value) in object {
        if value.is_null() {
            continue;
        }
        let Some(spec) = properties.get(field) else {
            continue;
        };

        if let Some(expected) = spec.get("type").and_then(Value::as_str) {
            if !matches_type(expected, value) {
                return Err(ToolError::validation(format!(
                    "field '{}' must be {}, got {}",
                    field,
                    expected,
                    json_type_name(value)
                )));
            }
        }

        if let Some(allowed) = spec.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(ToolError::validation(format!(
                    "field '{}' must be one of {}",
                    field,
                    Value::Array(allowed.clone())
                )));
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
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

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
