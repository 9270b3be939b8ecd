//! Contract error types for schema config

use thiserror::Error;

/// Result type for schema config operations
pub type Result<T> = std::result::Result<T, ConfigureError>;

/// Schema config errors
#[derive(Error, Debug)]
pub enum ConfigureError {
    #[error("Schema id {schema_id} is not installed")]
    SchemaNotInstalled { schema_id: String },

    #[error("Schema path for {schema_id} is empty")]
    EmptySchemaPath { schema_id: String },

    #[error("Invalid value for key {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Schema validation failed for key {key}: {}", errors.join(", "))]
    SchemaValidation { key: String, errors: Vec<String> },

    #[error("Invalid storage path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Backend error: {0}")]
    Backend(#[source] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for ConfigureError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
