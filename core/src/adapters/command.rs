//! Thin wrapper around `tokio::process::Command` shared by the adapters.

use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Run a command to completion and capture its output.
///
/// Fails only when the process cannot be spawned.
pub(crate) async fn output(program: &str, args: &[String]) -> Result<Output> {
    debug!(program = program, args = ?args, "Running command");

    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::CommandFailed(format!("Failed to run {}: {}", program, e)))
}

/// Run a command and return its stdout, treating a non-zero exit as failure.
pub(crate) async fn stdout(program: &str, args: &[String]) -> Result<String> {
    let output = output(program, args).await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::CommandFailed(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Build an owned argument list from string slices.
pub(crate) fn args<const N: usize>(items: [&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
