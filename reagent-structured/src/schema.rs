//! Lightweight JSON Schema validator.
//!
//! Covers the subset the structured-output coordinator needs: `type`,
//! `required`, `properties`, and `items` for arrays. This is a structural
//! check, not a full draft 2020-12 implementation — callers needing full
//! coverage should validate with an external `SchemaGenerator`/validator
//! and treat this as the fallback the coordinator always has available.

use serde_json::Value;

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn json_type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "integer" => matches!(value, Value::Number(n) if n.is_i64() || n.is_u64()),
        "number" => value.is_number(),
        other => json_type_name(value) == other,
    }
}

/// Validate `value` against `schema`, returning a human-readable error on
/// the first mismatch found.
pub fn validate(value: &Value, schema: &Value) -> Result<(), String> {
    let Some(expected_type) = schema.get("type").and_then(Value::as_str) else {
        // No `type` constraint: nothing to check at this level.
        return validate_object_fields(value, schema);
    };

    if !json_type_matches(expected_type, value) {
        return Err(format!(
            "expected type \"{expected_type}\", got \"{}\"",
            json_type_name(value)
        ));
    }

    if expected_type == "object" {
        return validate_object_fields(value, schema);
    }

    if expected_type == "array" {
        if let Some(item_schema) = schema.get("items") {
            if let Value::Array(items) = value {
                for (i, item) in items.iter().enumerate() {
                    validate(item, item_schema).map_err(|e| format!("items[{i}]: {e}"))?;
                }
            }
        }
    }

    Ok(())
}

fn validate_object_fields(value: &Value, schema: &Value) -> Result<(), String> {
    let Value::Object(obj) = value else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for req in required {
            let Some(name) = req.as_str() else { continue };
            if !obj.contains_key(name) {
                return Err(format!("missing required field \"{name}\""));
            }
        }
    }

    if let Some(Value::Object(props)) = schema.get("properties") {
        for (name, prop_schema) in props {
            if let Some(field_value) = obj.get(name) {
                validate(field_value, prop_schema).map_err(|e| format!("{name}: {e}"))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_matching_object() {
        let schema = json!({
            "type": "object",
            "required": ["location", "temperature"],
            "properties": {
                "location": {"type": "string"},
                "temperature": {"type": "string"}
            }
        });
        let value = json!({"location": "San Francisco", "temperature": "72°F"});
        assert!(validate(&value, &schema).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let schema = json!({"type": "object", "required": ["location"]});
        let value = json!({});
        assert!(validate(&value, &schema).is_err());
    }

    #[test]
    fn rejects_wrong_property_type() {
        let schema = json!({
            "type": "object",
            "properties": {"count": {"type": "integer"}}
        });
        let value = json!({"count": "not a number"});
        assert!(validate(&value, &schema).is_err());
    }

    #[test]
    fn validates_array_items() {
        let schema = json!({"type": "array", "items": {"type": "string"}});
        assert!(validate(&json!(["a", "b"]), &schema).is_ok());
        assert!(validate(&json!(["a", 2]), &schema).is_err());
    }
}
