//! Common test utilities: fixture schemas, counting backend, tracing

#![allow(dead_code)]

use parking_lot::Mutex;
use schema_config::{
    BackendConnection, ChangeHandler, Config, KeyDefinition, MemoryBackend, SchemaDefinition,
    SchemaRegistry, SettingsBackend,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const TEST_SCHEMA_ID: &str = "com.test.mytest";
pub const TEST_SCHEMA_PATH: &str = "/com/test/mytest/";
pub const TEST_APP: &str = "myapp";

/// Install a fmt subscriber once; honours RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("schema_config=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// The schema most tests run against
pub fn mytest_schema() -> SchemaDefinition {
    SchemaDefinition::relocatable(TEST_SCHEMA_ID)
        .with_key(
            "logFormat",
            KeyDefinition::new(json!("format")).with_summary("Log line format"),
        )
        .with_key(
            "maxFiles",
            KeyDefinition::new(json!(10)).with_schema(json!({ "type": "integer", "minimum": 1 })),
        )
        .with_key("enabled", KeyDefinition::new(json!(true)))
}

/// Default schema used by `SchemaRegistry::default_instance`
pub fn default_schema(config: &Config) -> SchemaDefinition {
    SchemaDefinition::relocatable(config.default_schema_id.clone())
        .with_key("logFormat", KeyDefinition::new(json!("%{message}")))
}

pub fn memory_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.install(mytest_schema());
    backend.install(default_schema(&Config::default()));
    backend
}

pub fn test_config() -> Config {
    Config::default().with_app_name(TEST_APP)
}

pub fn registry_with(backend: Arc<dyn SettingsBackend>) -> SchemaRegistry {
    init_tracing();
    SchemaRegistry::new(backend, test_config())
}

pub fn registry() -> (SchemaRegistry, MemoryBackend) {
    let backend = memory_backend();
    (registry_with(Arc::new(backend.clone())), backend)
}

/// Backend wrapper that counts calls reaching the connection
#[derive(Clone)]
pub struct CountingBackend {
    inner: MemoryBackend,
    calls: Arc<Mutex<HashMap<&'static str, usize>>>,
}

impl CountingBackend {
    pub fn new(inner: MemoryBackend) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    fn record(calls: &Mutex<HashMap<&'static str, usize>>, op: &'static str) {
        *calls.lock().entry(op).or_insert(0) += 1;
    }
}

impl SettingsBackend for CountingBackend {
    fn is_schema_installed(&self, schema_id: &str) -> bool {
        self.inner.is_schema_installed(schema_id)
    }

    fn open(&self, schema_id: &str, path: &str) -> anyhow::Result<Box<dyn BackendConnection>> {
        Self::record(&self.calls, "open");
        Ok(Box::new(CountingConnection {
            inner: self.inner.open(schema_id, path)?,
            calls: self.calls.clone(),
        }))
    }
}

struct CountingConnection {
    inner: Box<dyn BackendConnection>,
    calls: Arc<Mutex<HashMap<&'static str, usize>>>,
}

impl BackendConnection for CountingConnection {
    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn get(&self, key: &str) -> Option<Value> {
        CountingBackend::record(&self.calls, "get");
        self.inner.get(key)
    }

    fn try_set(&self, key: &str, value: &str) -> bool {
        CountingBackend::record(&self.calls, "try_set");
        self.inner.try_set(key, value)
    }

    fn reset(&self, key: &str) {
        CountingBackend::record(&self.calls, "reset");
        self.inner.reset(key)
    }

    fn subscribe(&self, on_change: ChangeHandler) {
        self.inner.subscribe(on_change)
    }
}
