//! Error types for the porty-core library.

use thiserror::Error;

/// Result type alias for porty operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during port discovery and process management.
///
/// Nothing here reaches the session loop as a fault: probe failures become
/// an empty registry, metadata failures become `"Unknown"` records, and kill
/// failures become `false`.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command (spawn failure or non-zero exit).
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Per-process metadata could not be resolved.
    #[error("Metadata unavailable for process {pid}")]
    MetadataUnavailable { pid: u32 },

    /// Failed to kill a process.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
