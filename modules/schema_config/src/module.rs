//! Module declaration and lifecycle: builds the shared registry at startup
//! and tears it down at exit.

use crate::config::Config;
use crate::contract::Result;
use crate::domain::{SchemaRegistry, SettingsBackend};
use crate::infra::MemoryBackend;
use std::sync::Arc;

/// Schema config module
pub struct SchemaConfigModule {
    registry: Arc<SchemaRegistry>,
}

impl SchemaConfigModule {
    /// Build the registry over an existing backend
    pub fn init(config: Config, backend: Arc<dyn SettingsBackend>) -> Self {
        let registry = Arc::new(SchemaRegistry::new(backend, config));
        tracing::info!(
            app_name = %registry.config().resolve_app_name(),
            default_schema_id = %registry.config().default_schema_id,
            "Schema config initialized"
        );
        Self { registry }
    }

    /// Build the registry over a [`MemoryBackend`] holding the schemas in `config.schema_dirs`
    pub fn from_config(config: Config) -> Result<Self> {
        let backend = MemoryBackend::from_dirs(&config.schema_dirs)?;
        Ok(Self::init(config, Arc::new(backend)))
    }

    /// Shared registry handle for callers
    pub fn registry(&self) -> Arc<SchemaRegistry> {
        self.registry.clone()
    }

    /// Teardown: release every registered instance
    pub fn shutdown(&self) {
        self.registry.shutdown();
    }
}
