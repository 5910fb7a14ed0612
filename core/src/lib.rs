//! Porty Core Library
//!
//! Discovers which processes are listening on TCP ports and drives the
//! interactive session that filters, selects and terminates them.
//! Provides functionality to:
//! - Probe listening sockets with the platform's native tooling
//! - Build a deduplicated, sorted process registry (all ports or dev ports)
//! - Kill processes by PID, with an elevated retry path
//! - Run the session state machine and its viewport math
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Registry builder, session controller and driver
//!
//! # Platform Support
//! - macOS: Uses `lsof` and `ps` commands
//! - Linux: Uses `ss` and `ps` commands
//! - Windows: Uses `netstat`, `wmic`, `tasklist` and `taskkill`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    extract_label, filter_records, shorten_paths, DevPorts, Platform, ProcessRecord,
    DEV_PORTS,
};

// Re-export other commonly used types
pub use adapters::{CommandProbe, SystemMetadata, SystemTerminator};
pub use application::{
    viewport_height, window, Effect, Key, RegistryBuilder, SessionController, SessionDriver,
    SessionEvent, SessionMode, SessionSettings, SessionState, Timer,
};
pub use config::{Config, ConfigStore};
pub use error::{Error, Result};
