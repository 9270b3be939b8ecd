//! Settings backend traits
//!
//! These traits define the storage engine the domain relies on.
//! The shipped implementation lives in infra/memory.

use anyhow::Result;
use serde_json::Value;

/// Callback invoked by a connection with the name of the changed key
pub type ChangeHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Storage engine with installed-schema introspection
pub trait SettingsBackend: Send + Sync {
    /// Check whether a schema id is installed
    fn is_schema_installed(&self, schema_id: &str) -> bool;

    /// Open a connection for `schema_id` stored at `path`
    fn open(&self, schema_id: &str, path: &str) -> Result<Box<dyn BackendConnection>>;
}

/// One open connection bound to a (schema id, path) pair
///
/// Implementations must be safe to call concurrently; the domain does not
/// serialize access to a connection.
pub trait BackendConnection: Send + Sync {
    /// Keys declared by the schema, in declaration order
    fn keys(&self) -> Vec<String>;

    /// Current value of a key, `None` if the key is unknown
    fn get(&self, key: &str) -> Option<Value>;

    /// Attempt to write a key from its textual form
    fn try_set(&self, key: &str, value: &str) -> bool;

    /// Restore a key to its schema default
    fn reset(&self, key: &str);

    /// Register a handler for change events on this connection
    fn subscribe(&self, on_change: ChangeHandler);
}
