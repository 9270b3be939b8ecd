//! Schema instance - validated accessor bound to one backend connection

use crate::contract::{ConfigureError, Result, SchemaIdentity};
use crate::domain::backend::{BackendConnection, SettingsBackend};
use crate::domain::events::{ChangeNotifier, ValueChanged};
use crate::domain::validation;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// In-process handle binding one backend connection to one [`SchemaIdentity`]
///
/// Instances are created through [`SchemaRegistry`](crate::domain::SchemaRegistry)
/// and shared as `Arc<SchemaInstance>`. The backend connection is released when
/// the last reference is dropped.
pub struct SchemaInstance {
    identity: SchemaIdentity,
    backend: Arc<dyn SettingsBackend>,
    connection: Box<dyn BackendConnection>,
    notifier: Arc<ChangeNotifier>,
}

impl SchemaInstance {
    /// Open the backend connection at `schema_path + app_name + "/"` and wire
    /// its change events into the instance.
    pub(crate) fn open(
        backend: Arc<dyn SettingsBackend>,
        identity: SchemaIdentity,
        event_capacity: usize,
    ) -> Result<Self> {
        if identity.schema_path.is_empty() {
            return Err(ConfigureError::EmptySchemaPath {
                schema_id: identity.schema_id.clone(),
            });
        }

        let connection = backend
            .open(&identity.schema_id, &identity.storage_path())
            .map_err(ConfigureError::Backend)?;

        let notifier = Arc::new(ChangeNotifier::new(identity.clone(), event_capacity));
        let forward = notifier.clone();
        connection.subscribe(Box::new(move |key: &str| forward.notify(key)));

        tracing::info!(%identity, "Schema instance created");

        Ok(Self {
            identity,
            backend,
            connection,
            notifier,
        })
    }

    pub fn identity(&self) -> &SchemaIdentity {
        &self.identity
    }

    pub fn app_name(&self) -> &str {
        &self.identity.app_name
    }

    pub fn schema_id(&self) -> &str {
        &self.identity.schema_id
    }

    pub fn schema_path(&self) -> &str {
        &self.identity.schema_path
    }

    /// Path the backend connection was opened at
    pub fn storage_path(&self) -> String {
        self.identity.storage_path()
    }

    /// Check a schema id against the backend's installed schemas
    pub fn is_valid_schema_id(&self, schema_id: &str) -> bool {
        validation::is_valid_schema_id(self.backend.as_ref(), schema_id)
    }

    /// True iff this instance's schema is installed and declares `key`
    pub fn is_valid_key(&self, key: &str) -> bool {
        validation::is_valid_key(
            self.backend.as_ref(),
            self.connection.as_ref(),
            &self.identity.schema_id,
            key,
        )
    }

    /// Current value of `key`, or an empty string if the key is not valid
    pub fn get_value(&self, key: &str) -> String {
        if !self.is_valid_key(key) {
            return String::new();
        }
        self.connection
            .get(key)
            .map(|value| validation::render_value(&value))
            .unwrap_or_default()
    }

    /// Write `value` to `key`; false if the key is not valid or the backend rejects it
    pub fn set_value(&self, key: &str, value: &str) -> bool {
        if !self.is_valid_key(key) {
            return false;
        }
        let accepted = self.connection.try_set(key, value);
        if accepted {
            tracing::debug!(schema_id = %self.identity.schema_id, key, "Value set");
        } else {
            tracing::warn!(schema_id = %self.identity.schema_id, key, value, "Backend rejected value");
        }
        accepted
    }

    /// Restore `key` to its schema-declared default.
    ///
    /// Only valid keys are reset; unknown keys are logged and left alone.
    pub fn reset_value(&self, key: &str) {
        if !self.is_valid_key(key) {
            return;
        }
        self.connection.reset(key);
        tracing::debug!(schema_id = %self.identity.schema_id, key, "Value reset");
    }

    /// Every key of the schema, empty if the schema is no longer installed
    pub fn all_keys(&self) -> Vec<String> {
        if !self.is_valid_schema_id(&self.identity.schema_id) {
            return Vec::new();
        }
        self.connection.keys()
    }

    /// Register the change callback, replacing any earlier one.
    ///
    /// The callback runs synchronously on whatever thread the backend reports
    /// the change from.
    pub fn set_on_value_changed_callback<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.notifier.set_callback(Some(Arc::new(callback)));
    }

    pub fn clear_on_value_changed_callback(&self) {
        self.notifier.set_callback(None);
    }

    /// Receive every change as a [`ValueChanged`] event, independent of the callback slot
    pub fn subscribe(&self) -> broadcast::Receiver<ValueChanged> {
        self.notifier.subscribe()
    }
}

impl fmt::Debug for SchemaInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaInstance")
            .field("identity", &self.identity)
            .field("has_callback", &self.notifier.has_callback())
            .finish()
    }
}

impl Drop for SchemaInstance {
    fn drop(&mut self) {
        tracing::debug!(identity = %self.identity, "Releasing backend connection");
    }
}
