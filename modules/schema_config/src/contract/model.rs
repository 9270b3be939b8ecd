//! Contract models for schema config
//!
//! Identity of a schema instance plus the shape of installed schema definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity of one schema instance: (app name, schema id, schema path).
///
/// Two identities are equal only when all three fields match byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaIdentity {
    /// Application the settings belong to
    pub app_name: String,
    /// Installed schema identifier (e.g., "com.test.mytest")
    pub schema_id: String,
    /// Base storage path (e.g., "/com/test/mytest/")
    pub schema_path: String,
}

impl SchemaIdentity {
    pub fn new(
        app_name: impl Into<String>,
        schema_id: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            schema_id: schema_id.into(),
            schema_path: schema_path.into(),
        }
    }

    /// Path the backend connection is opened at: `schema_path + app_name + "/"`
    pub fn storage_path(&self) -> String {
        format!("{}{}/", self.schema_path, self.app_name)
    }
}

impl fmt::Display for SchemaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] [{}]", self.schema_id, self.schema_path, self.app_name)
    }
}

/// Installed schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Schema identifier
    pub id: String,
    /// Fixed storage path; `None` for relocatable schemas
    #[serde(default)]
    pub path: Option<String>,
    /// Key declarations in declaration order
    #[serde(default)]
    pub keys: IndexMap<String, KeyDefinition>,
}

impl SchemaDefinition {
    /// Create an empty relocatable schema
    pub fn relocatable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: None,
            keys: IndexMap::new(),
        }
    }

    /// Builder-style key declaration
    pub fn with_key(mut self, name: impl Into<String>, key: KeyDefinition) -> Self {
        self.keys.insert(name.into(), key);
        self
    }

    pub fn is_relocatable(&self) -> bool {
        self.path.is_none()
    }
}

/// A single key of a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyDefinition {
    /// Schema-declared default; also fixes the key's value type
    pub default: Value,
    /// Optional JSON Schema every written value must satisfy
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl KeyDefinition {
    pub fn new(default: Value) -> Self {
        Self {
            default,
            schema: None,
            summary: None,
            description: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn value_type(&self) -> ValueType {
        ValueType::of(&self.default)
    }
}

/// Value type of a key, derived from its default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Boolean,
    Integer,
    Number,
    Array,
    Object,
    Null,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_f64() => Self::Number,
            Value::Number(_) => Self::Integer,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null => Self::Null,
        }
    }

    /// Whether a value of type `other` may be stored in a slot of this type
    pub fn accepts(self, other: ValueType) -> bool {
        self == other || (self == Self::Number && other == Self::Integer)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_equality_is_exact() {
        let a = SchemaIdentity::new("myapp", "com.test.mytest", "/com/test/mytest/");
        let b = SchemaIdentity::new("myapp", "com.test.mytest", "/com/test/mytest/");
        let c = SchemaIdentity::new("myapp", "com.test.mytest", "/com/test/mytest");
        let d = SchemaIdentity::new("MyApp", "com.test.mytest", "/com/test/mytest/");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_storage_path_appends_app_name() {
        let identity = SchemaIdentity::new("myapp", "com.test.mytest", "/com/test/mytest/");
        assert_eq!(identity.storage_path(), "/com/test/mytest/myapp/");
    }

    #[test]
    fn test_value_type_of_default() {
        assert_eq!(ValueType::of(&json!("x")), ValueType::String);
        assert_eq!(ValueType::of(&json!(true)), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!(3)), ValueType::Integer);
        assert_eq!(ValueType::of(&json!(0.5)), ValueType::Number);
        assert_eq!(ValueType::of(&json!(["a"])), ValueType::Array);
    }

    #[test]
    fn test_number_slot_accepts_integer() {
        assert!(ValueType::Number.accepts(ValueType::Integer));
        assert!(!ValueType::Integer.accepts(ValueType::Number));
        assert!(!ValueType::String.accepts(ValueType::Boolean));
    }

    #[test]
    fn test_definition_from_yaml_keeps_key_order() {
        let yaml = r#"
id: com.test.mytest
keys:
  logFormat:
    default: "format"
  maxFiles:
    default: 10
    schema: { type: integer, minimum: 1 }
  enabled:
    default: true
"#;
        let def: SchemaDefinition = serde_yaml::from_str(yaml).unwrap();
        assert!(def.is_relocatable());
        let names: Vec<&str> = def.keys.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["logFormat", "maxFiles", "enabled"]);
        assert_eq!(def.keys["maxFiles"].value_type(), ValueType::Integer);
    }
}
