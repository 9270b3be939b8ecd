//! Infrastructure layer - settings backend implementations

pub mod memory;

pub use memory::MemoryBackend;
