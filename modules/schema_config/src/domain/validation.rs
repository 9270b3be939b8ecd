//! Schema id, key and value validation

use crate::contract::{ConfigureError, KeyDefinition, ValueType};
use crate::domain::backend::{BackendConnection, SettingsBackend};
use jsonschema::Validator;
use serde_json::Value;

/// True iff `schema_id` is installed in the backend; logs a warning otherwise
pub fn is_valid_schema_id(backend: &dyn SettingsBackend, schema_id: &str) -> bool {
    if !backend.is_schema_installed(schema_id) {
        tracing::warn!(schema_id, "Schema id does not exist");
        return false;
    }
    true
}

/// True iff the schema is installed and the connection declares `key`
pub fn is_valid_key(
    backend: &dyn SettingsBackend,
    connection: &dyn BackendConnection,
    schema_id: &str,
    key: &str,
) -> bool {
    if !is_valid_schema_id(backend, schema_id) {
        return false;
    }
    if !connection.keys().iter().any(|k| k == key) {
        tracing::warn!(schema_id, key, "Key is not declared by schema");
        return false;
    }
    true
}

/// Validate a storage path: must start and end with '/' and contain no "//"
pub fn validate_storage_path(path: &str) -> Result<(), ConfigureError> {
    let reason = if !path.starts_with('/') {
        Some("path must start with '/'")
    } else if !path.ends_with('/') {
        Some("path must end with '/'")
    } else if path.contains("//") {
        Some("path must not contain '//'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigureError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Convert the textual form of a value into the key's typed value
///
/// String keys take the text verbatim; every other type is parsed as JSON.
pub fn parse_value(name: &str, key: &KeyDefinition, raw: &str) -> Result<Value, ConfigureError> {
    let expected = key.value_type();

    let value = if expected == ValueType::String {
        Value::String(raw.to_string())
    } else {
        serde_json::from_str::<Value>(raw).map_err(|e| ConfigureError::InvalidValue {
            key: name.to_string(),
            message: format!("expected {}: {}", expected, e),
        })?
    };

    let actual = ValueType::of(&value);
    if !expected.accepts(actual) {
        return Err(ConfigureError::InvalidValue {
            key: name.to_string(),
            message: format!("expected {}, got {}", expected, actual),
        });
    }

    if let Some(schema) = &key.schema {
        validate_against_schema(name, &value, schema)?;
    }

    Ok(value)
}

/// Validate a value against a JSON Schema
pub fn validate_against_schema(name: &str, data: &Value, schema: &Value) -> Result<(), ConfigureError> {
    let validator = Validator::new(schema).map_err(|e| ConfigureError::InvalidValue {
        key: name.to_string(),
        message: format!("Invalid JSON Schema: {}", e),
    })?;

    if let Err(error) = validator.validate(data) {
        return Err(ConfigureError::SchemaValidation {
            key: name.to_string(),
            errors: vec![error.to_string()],
        });
    }

    Ok(())
}

/// Render a backend value as the string handed to callers
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storage_path_rules() {
        assert!(validate_storage_path("/com/test/mytest/myapp/").is_ok());
        assert!(validate_storage_path("/").is_ok());
        assert!(validate_storage_path("com/test/").is_err());
        assert!(validate_storage_path("/com/test").is_err());
        assert!(validate_storage_path("/com//test/").is_err());
        assert!(validate_storage_path("").is_err());
    }

    #[test]
    fn test_string_key_takes_text_verbatim() {
        let key = KeyDefinition::new(json!("format"));
        assert_eq!(parse_value("logFormat", &key, "42").unwrap(), json!("42"));
        assert_eq!(parse_value("logFormat", &key, "").unwrap(), json!(""));
    }

    #[test]
    fn test_typed_keys_parse_json() {
        let int_key = KeyDefinition::new(json!(10));
        assert_eq!(parse_value("maxFiles", &int_key, "25").unwrap(), json!(25));

        let bool_key = KeyDefinition::new(json!(false));
        assert_eq!(parse_value("enabled", &bool_key, "true").unwrap(), json!(true));

        let number_key = KeyDefinition::new(json!(0.5));
        assert_eq!(parse_value("ratio", &number_key, "2").unwrap(), json!(2));
    }

    #[test]
    fn test_type_mismatch() {
        let int_key = KeyDefinition::new(json!(10));
        let result = parse_value("maxFiles", &int_key, "not a number");
        assert!(matches!(result, Err(ConfigureError::InvalidValue { .. })));

        let result = parse_value("maxFiles", &int_key, "1.5");
        assert!(matches!(result, Err(ConfigureError::InvalidValue { .. })));

        let bool_key = KeyDefinition::new(json!(false));
        assert!(parse_value("enabled", &bool_key, "\"yes\"").is_err());
    }

    #[test]
    fn test_schema_constraints_are_enforced() {
        let key = KeyDefinition::new(json!(10)).with_schema(json!({
            "type": "integer",
            "minimum": 1,
            "maximum": 100
        }));

        assert!(parse_value("maxFiles", &key, "50").is_ok());

        let result = parse_value("maxFiles", &key, "0");
        if let Err(ConfigureError::SchemaValidation { key, errors }) = result {
            assert_eq!(key, "maxFiles");
            assert!(!errors.is_empty());
        } else {
            panic!("Expected SchemaValidation error");
        }
    }

    #[test]
    fn test_enum_schema_on_string_key() {
        let key = KeyDefinition::new(json!("info")).with_schema(json!({
            "enum": ["debug", "info", "warn"]
        }));

        assert!(parse_value("level", &key, "warn").is_ok());
        assert!(parse_value("level", &key, "verbose").is_err());
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("text")), "text");
        assert_eq!(render_value(&json!(null)), "");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&json!(7)), "7");
        assert_eq!(render_value(&json!(["a", "b"])), "[\"a\",\"b\"]");
    }
}
