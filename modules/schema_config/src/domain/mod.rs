//! Domain layer - registry, instances and change notification

pub mod backend;
pub mod events;
pub mod instance;
pub mod registry;
pub mod validation;

pub use backend::{BackendConnection, ChangeHandler, SettingsBackend};
pub use events::{ValueChanged, ValueChangedCallback};
pub use instance::SchemaInstance;
pub use registry::SchemaRegistry;
