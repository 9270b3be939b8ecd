//! Process-wide entry points
//!
//! Startup code installs one registry; library code anywhere in the process can
//! then reach the default instance or select a schema without threading the
//! registry through. Prefer passing `Arc<SchemaRegistry>` where possible.

use crate::domain::{SchemaInstance, SchemaRegistry};
use once_cell::sync::OnceCell;
use std::sync::Arc;

static REGISTRY: OnceCell<Arc<SchemaRegistry>> = OnceCell::new();

/// Publish `registry` for the process. Returns it back if one is already installed.
pub fn install(registry: Arc<SchemaRegistry>) -> Result<(), Arc<SchemaRegistry>> {
    REGISTRY.set(registry)
}

/// Installed registry, if any
pub fn registry() -> Option<Arc<SchemaRegistry>> {
    REGISTRY.get().cloned()
}

/// Default instance for the configured application
pub fn configure() -> Option<Arc<SchemaInstance>> {
    match REGISTRY.get() {
        Some(registry) => Some(registry.default_instance()),
        None => {
            tracing::warn!("No schema registry installed");
            None
        }
    }
}

/// Select or create a schema; `app_name` defaults to the configured application
pub fn configure_select(
    schema_id: &str,
    schema_path: &str,
    app_name: Option<&str>,
) -> Option<Arc<SchemaInstance>> {
    match REGISTRY.get() {
        Some(registry) => registry.select_schema(schema_id, schema_path, app_name),
        None => {
            tracing::warn!(schema_id, "No schema registry installed");
            None
        }
    }
}

/// Default instance of the installed registry
#[macro_export]
macro_rules! configure {
    () => {
        $crate::api::global::configure()
    };
}

/// `configure_select!(schema_id, schema_path)` or `configure_select!(schema_id, schema_path, app_name)`
#[macro_export]
macro_rules! configure_select {
    ($schema_id:expr, $schema_path:expr $(,)?) => {
        $crate::api::global::configure_select($schema_id, $schema_path, None)
    };
    ($schema_id:expr, $schema_path:expr, $app_name:expr $(,)?) => {
        $crate::api::global::configure_select($schema_id, $schema_path, Some($app_name))
    };
}
