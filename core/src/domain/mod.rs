//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod dev_ports;
mod label;
mod platform;
mod process;

// Re-export all domain types
pub use dev_ports::{DevPorts, DEV_PORTS};
pub use label::{extract_label, shorten_paths};
pub use platform::Platform;
pub use process::{
    filter_records, ListeningSocket, ProcessMetadata, ProcessRecord, UNKNOWN_PROCESS,
};
