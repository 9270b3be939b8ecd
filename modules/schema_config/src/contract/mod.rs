//! Contract layer - identity, schema definitions and errors shared by all layers

pub mod error;
pub mod model;

pub use error::{ConfigureError, Result};
pub use model::{KeyDefinition, SchemaDefinition, SchemaIdentity, ValueType};
