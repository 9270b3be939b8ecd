//! In-process settings backend
//!
//! Stores values per (schema id, path) in memory. Connections opened at the
//! same pair share one store, so writes from any connection (or from
//! [`MemoryBackend::write`]) are observed by all of them.

pub mod loader;

use crate::contract::{ConfigureError, SchemaDefinition, ValueType};
use crate::domain::backend::{BackendConnection, ChangeHandler, SettingsBackend};
use crate::domain::validation;
use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type StoreKey = (String, String); // (schema_id, path)

/// Thread-safe in-memory [`SettingsBackend`]
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<BackendState>>,
}

#[derive(Default)]
struct BackendState {
    schemas: HashMap<String, SchemaDefinition>,
    stores: HashMap<StoreKey, Arc<Store>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with every schema found in `dirs` installed
    pub fn from_dirs(dirs: &[PathBuf]) -> Result<Self, ConfigureError> {
        let backend = Self::new();
        for dir in dirs {
            for definition in loader::load_schema_dir(dir)? {
                backend.install(definition);
            }
        }
        Ok(backend)
    }

    /// Install (or replace) a schema definition.
    ///
    /// Stores already opened for the schema switch to the new definition.
    pub fn install(&self, definition: SchemaDefinition) {
        tracing::debug!(schema_id = %definition.id, keys = definition.keys.len(), "Installing schema");
        let mut state = self.inner.write();
        for ((schema_id, _), store) in state.stores.iter() {
            if *schema_id == definition.id {
                store.replace_definition(definition.clone());
            }
        }
        state.schemas.insert(definition.id.clone(), definition);
    }

    /// Remove a schema; open connections keep their store
    pub fn uninstall(&self, schema_id: &str) -> bool {
        self.inner.write().schemas.remove(schema_id).is_some()
    }

    /// Installed schema ids, sorted
    pub fn installed_schemas(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.read().schemas.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Write a key at `(schema_id, path)` without going through a connection,
    /// the way an external settings editor would.
    pub fn write(&self, schema_id: &str, path: &str, key: &str, value: &str) -> Result<bool> {
        let store = self.store(schema_id, path)?;
        Ok(store.try_set(key, value))
    }

    fn store(&self, schema_id: &str, path: &str) -> Result<Arc<Store>> {
        validation::validate_storage_path(path)?;

        let mut state = self.inner.write();
        let definition = state
            .schemas
            .get(schema_id)
            .cloned()
            .ok_or_else(|| anyhow!("schema {} is not installed", schema_id))?;

        if let Some(fixed) = definition.path.as_deref() {
            if fixed != path {
                return Err(anyhow!(
                    "schema {} is not relocatable and lives at {}, not {}",
                    schema_id,
                    fixed,
                    path
                ));
            }
        }

        let store = state
            .stores
            .entry((schema_id.to_string(), path.to_string()))
            .or_insert_with(|| Arc::new(Store::new(definition)))
            .clone();
        Ok(store)
    }
}

impl SettingsBackend for MemoryBackend {
    fn is_schema_installed(&self, schema_id: &str) -> bool {
        self.inner.read().schemas.contains_key(schema_id)
    }

    fn open(&self, schema_id: &str, path: &str) -> Result<Box<dyn BackendConnection>> {
        let store = self.store(schema_id, path)?;
        Ok(Box::new(MemoryConnection::new(store)))
    }
}

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Values and subscribers for one (schema id, path)
struct Store {
    definition: RwLock<SchemaDefinition>,
    values: RwLock<HashMap<String, Value>>,
    /// (connection id, handler)
    subscribers: RwLock<Vec<(u64, Arc<ChangeHandler>)>>,
}

impl Store {
    fn new(definition: SchemaDefinition) -> Self {
        Self {
            definition: RwLock::new(definition),
            values: RwLock::new(HashMap::new()),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Swap in a reinstalled definition, dropping user values it no longer accepts
    fn replace_definition(&self, definition: SchemaDefinition) {
        let mut values = self.values.write();
        values.retain(|key, value| {
            definition
                .keys
                .get(key)
                .is_some_and(|declared| declared.value_type().accepts(ValueType::of(value)))
        });
        *self.definition.write() = definition;
    }

    fn keys(&self) -> Vec<String> {
        self.definition.read().keys.keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<Value> {
        let default = self.definition.read().keys.get(key)?.default.clone();
        let value = self.values.read().get(key).cloned().unwrap_or(default);
        Some(value)
    }

    fn try_set(&self, key: &str, raw: &str) -> bool {
        let parsed = {
            let definition = self.definition.read();
            let Some(declared) = definition.keys.get(key) else {
                return false;
            };
            validation::parse_value(key, declared, raw)
        };
        let value = match parsed {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "Write rejected");
                return false;
            }
        };
        self.values.write().insert(key.to_string(), value);
        self.emit(key);
        true
    }

    fn reset(&self, key: &str) {
        let removed = self.values.write().remove(key).is_some();
        if removed {
            self.emit(key);
        }
    }

    fn subscribe(&self, connection_id: u64, handler: ChangeHandler) {
        self.subscribers.write().push((connection_id, Arc::new(handler)));
    }

    fn unsubscribe(&self, connection_id: u64) {
        self.subscribers.write().retain(|(id, _)| *id != connection_id);
    }

    /// Runs handlers with no store lock held.
    fn emit(&self, key: &str) {
        let handlers: Vec<Arc<ChangeHandler>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(key);
        }
    }
}

struct MemoryConnection {
    id: u64,
    store: Arc<Store>,
}

impl MemoryConnection {
    fn new(store: Arc<Store>) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            store,
        }
    }
}

impl BackendConnection for MemoryConnection {
    fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    fn try_set(&self, key: &str, value: &str) -> bool {
        self.store.try_set(key, value)
    }

    fn reset(&self, key: &str) {
        self.store.reset(key)
    }

    fn subscribe(&self, on_change: ChangeHandler) {
        self.store.subscribe(self.id, on_change)
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.store.unsubscribe(self.id);
    }
}
