//! Application layer - Use case services.
//!
//! This module orchestrates domain logic and adapter interactions:
//! - `registry` turns probe output and metadata into snapshots
//! - `session` is the pure interactive state machine
//! - `driver` executes the session's effects on tokio tasks
//! - `viewport` holds the scrolling math shared with renderers

mod driver;
mod registry;
mod session;
mod viewport;

pub use driver::SessionDriver;
pub use registry::RegistryBuilder;
pub use session::{
    Effect, Key, SessionController, SessionEvent, SessionMode, SessionSettings, SessionState,
    Timer,
};
pub use viewport::{viewport_height, window};
