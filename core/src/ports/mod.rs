//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod metadata;
mod probe;
mod terminator;

pub use metadata::MetadataSource;
pub use probe::SocketProbe;
pub use terminator::ProcessTerminator;
