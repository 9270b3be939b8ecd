//! API layer - process-wide convenience entry points

pub mod global;
