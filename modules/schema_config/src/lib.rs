//! Schema Config Module
//!
//! Schema-backed configuration accessor. Settings live in an external backend
//! keyed by installed schema id and storage path; this crate keeps one shared
//! [`SchemaInstance`] per (schema id, schema path, app name), validates every
//! key against the schema before touching the backend, and forwards backend
//! change events to callers.
//!
//! ```no_run
//! use schema_config::{Config, SchemaConfigModule};
//!
//! let module = SchemaConfigModule::from_config(Config::load(None)?)?;
//! let registry = module.registry();
//!
//! if let Some(config) = registry.select_schema("com.test.mytest", "/com/test/mytest/", None) {
//!     let format = config.get_value("logFormat");
//!     config.set_value("logFormat", "%{time} %{message}");
//!     config.reset_value("logFormat");
//!     println!("{format} / {:?}", config.all_keys());
//! }
//! # Ok::<(), schema_config::ConfigureError>(())
//! ```

// Public exports
pub mod contract;
pub use contract::{
    ConfigureError, KeyDefinition, Result, SchemaDefinition, SchemaIdentity, ValueType,
};

pub mod domain;
pub use domain::{
    BackendConnection, ChangeHandler, SchemaInstance, SchemaRegistry, SettingsBackend,
    ValueChanged,
};

pub mod config;
pub use config::Config;

pub mod module;
pub use module::SchemaConfigModule;

pub mod infra;
pub use infra::MemoryBackend;

pub mod api;
