//! Schema registry - one shared instance per (schema id, schema path, app name)

use crate::config::Config;
use crate::contract::{ConfigureError, Result, SchemaIdentity};
use crate::domain::backend::SettingsBackend;
use crate::domain::instance::SchemaInstance;
use crate::domain::validation;
use parking_lot::Mutex;
use std::sync::Arc;

/// Registry of schema instances
///
/// Owned by application startup code and shared by reference. Lookup-or-create
/// runs under a single mutex, so concurrent selections of the same identity
/// always observe one instance. The default instance is built at most once
/// per registry lifetime; its slot is cleared again by [`shutdown`](Self::shutdown).
pub struct SchemaRegistry {
    backend: Arc<dyn SettingsBackend>,
    config: Config,
    /// Append-only collection of instances
    instances: Mutex<Vec<Arc<SchemaInstance>>>,
    /// Lazily built default instance; locked before `instances`, never after
    default_instance: Mutex<Option<Arc<SchemaInstance>>>,
}

impl SchemaRegistry {
    /// Create a new registry over `backend`
    pub fn new(backend: Arc<dyn SettingsBackend>, config: Config) -> Self {
        Self {
            backend,
            config,
            instances: Mutex::new(Vec::new()),
            default_instance: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn SettingsBackend> {
        &self.backend
    }

    /// Check a schema id against the backend's installed schemas
    pub fn is_valid_schema_id(&self, schema_id: &str) -> bool {
        validation::is_valid_schema_id(self.backend.as_ref(), schema_id)
    }

    // ===== Default Instance =====

    /// Default instance for the configured application name
    pub fn default_instance(&self) -> Arc<SchemaInstance> {
        self.default_instance_for(&self.config.resolve_app_name())
    }

    /// Default instance, built on first call for `app_name`.
    ///
    /// Later calls return the same instance whatever `app_name` they pass.
    /// Construction failure is unrecoverable and terminates the process.
    pub fn default_instance_for(&self, app_name: &str) -> Arc<SchemaInstance> {
        match self.try_default_instance(app_name) {
            Ok(instance) => instance,
            Err(err) => fatal(&err),
        }
    }

    /// Fallible form of [`default_instance_for`](Self::default_instance_for)
    pub fn try_default_instance(&self, app_name: &str) -> Result<Arc<SchemaInstance>> {
        // Held across construction so concurrent first callers build it once.
        let mut slot = self.default_instance.lock();
        if let Some(instance) = slot.as_ref() {
            return Ok(instance.clone());
        }

        let identity = SchemaIdentity::new(
            app_name,
            self.config.default_schema_id.clone(),
            self.config.default_schema_path.clone(),
        );
        if identity.schema_path.is_empty() {
            return Err(ConfigureError::EmptySchemaPath {
                schema_id: identity.schema_id,
            });
        }

        let instance = self.lookup_or_create(identity)?;
        *slot = Some(instance.clone());
        Ok(instance)
    }

    // ===== Selection =====

    /// Select the instance for `(schema_id, schema_path, app_name)`, creating it if needed.
    ///
    /// Fails with [`ConfigureError::EmptySchemaPath`] for an empty path and with
    /// [`ConfigureError::SchemaNotInstalled`] for an unknown schema id; neither
    /// failure touches the registry.
    pub fn select_or_create(
        &self,
        schema_id: &str,
        schema_path: &str,
        app_name: &str,
    ) -> Result<Arc<SchemaInstance>> {
        if schema_path.is_empty() {
            return Err(ConfigureError::EmptySchemaPath {
                schema_id: schema_id.to_string(),
            });
        }
        if !self.is_valid_schema_id(schema_id) {
            tracing::warn!(
                schema_id,
                "Create schema failed, schema id is not installed"
            );
            return Err(ConfigureError::SchemaNotInstalled {
                schema_id: schema_id.to_string(),
            });
        }

        self.lookup_or_create(SchemaIdentity::new(app_name, schema_id, schema_path))
    }

    /// Convenience selection: `None` on failure, configured app name when `app_name` is `None`.
    ///
    /// An empty `schema_path` is a programmer error and terminates the process.
    pub fn select_schema(
        &self,
        schema_id: &str,
        schema_path: &str,
        app_name: Option<&str>,
    ) -> Option<Arc<SchemaInstance>> {
        let app_name = match app_name {
            Some(name) => name.to_string(),
            None => self.config.resolve_app_name(),
        };

        match self.select_or_create(schema_id, schema_path, &app_name) {
            Ok(instance) => Some(instance),
            Err(err @ ConfigureError::EmptySchemaPath { .. }) => fatal(&err),
            Err(err) => {
                tracing::warn!(error = %err, "Select schema failed");
                None
            }
        }
    }

    fn lookup_or_create(&self, identity: SchemaIdentity) -> Result<Arc<SchemaInstance>> {
        let mut instances = self.instances.lock();

        if let Some(existing) = instances.iter().find(|i| *i.identity() == identity) {
            tracing::info!(
                %identity,
                "Schema already in instance list, returning existing instance"
            );
            return Ok(existing.clone());
        }

        let instance = Arc::new(SchemaInstance::open(
            self.backend.clone(),
            identity,
            self.config.event_capacity,
        )?);
        instances.push(instance.clone());
        Ok(instance)
    }

    // ===== Introspection =====

    /// Snapshot of registered instances in creation order
    pub fn instances(&self) -> Vec<Arc<SchemaInstance>> {
        self.instances.lock().clone()
    }

    pub fn contains(&self, identity: &SchemaIdentity) -> bool {
        self.instances.lock().iter().any(|i| i.identity() == identity)
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Process teardown: drop the registry's references to every instance,
    /// the default instance included.
    ///
    /// Connections are released as soon as callers drop their own references.
    /// A later `default_instance` call builds a fresh default.
    pub fn shutdown(&self) {
        let mut slot = self.default_instance.lock();
        let default = slot.take();
        let drained: Vec<_> = self.instances.lock().drain(..).collect();
        drop(slot);
        tracing::info!(
            count = drained.len(),
            had_default = default.is_some(),
            "Schema registry shut down"
        );
    }
}

fn fatal(err: &ConfigureError) -> ! {
    tracing::error!(error = %err, "Create schema failed");
    eprintln!("schema_config: fatal: {}", err);
    std::process::abort()
}
