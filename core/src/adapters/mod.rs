//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

mod command;
pub mod killer;
pub mod metadata;
pub mod scanner;

// Re-export main types for convenience
pub use killer::SystemTerminator;
pub use metadata::SystemMetadata;
pub use scanner::{parse_listening, CommandProbe};
