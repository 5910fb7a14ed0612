//! Process termination adapter.
//!
//! Kills go through the platform tools (`taskkill`, `kill -9`) so that the
//! elevated path can re-issue exactly the same command under `sudo` or an
//! elevated PowerShell.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, info, warn};

use crate::adapters::command;
use crate::domain::Platform;
use crate::error::{Error, Result};
use crate::ports::ProcessTerminator;

/// Terminator backed by the platform's kill and process listing commands.
#[derive(Debug, Clone, Copy)]
pub struct SystemTerminator {
    platform: Platform,
}

impl SystemTerminator {
    /// Create a terminator for the current platform.
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self { platform }
    }
}

impl SystemTerminator {
    async fn kill(&self, pid: u32) -> Result<()> {
        let (program, args) = kill_command(self.platform, pid);
        command::stdout(program, &args)
            .await
            .map(|_| ())
            .map_err(|e| Error::KillFailed {
                pid,
                reason: e.to_string(),
            })
    }
}

impl Default for SystemTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTerminator for SystemTerminator {
    async fn terminate(&self, pid: u32) -> bool {
        if pid == 0 {
            return false;
        }

        match self.kill(pid).await {
            Ok(()) => {
                info!(pid = pid, "Process killed");
                true
            }
            Err(e) => {
                warn!(error = %e, "Kill failed");
                false
            }
        }
    }

    async fn exists(&self, pid: u32) -> bool {
        let (program, args) = exists_command(self.platform, pid);
        match command::stdout(program, &args).await {
            Ok(stdout) => match self.platform {
                Platform::Windows => tasklist_reports_pid(&stdout, pid),
                Platform::Darwin | Platform::Linux => stdout.trim() == pid.to_string(),
            },
            // ps exits non-zero when the pid is gone
            Err(e) => {
                debug!(pid = pid, error = %e, "Existence check failed");
                false
            }
        }
    }

    fn terminate_elevated(&self, pid: u32, process_label: &str) {
        let (program, args) = elevation_command(self.platform, pid, process_label);
        let platform = self.platform;
        info!(pid = pid, program = program, "Launching elevated kill");

        tokio::spawn(async move {
            match command::output(program, &args).await {
                Ok(output) if output.status.success() => {
                    debug!(pid = pid, "Elevated kill command exited");
                }
                // exit code 1 is what a cancelled UAC prompt looks like
                Ok(output) if platform == Platform::Windows && output.status.code() == Some(1) => {
                    debug!(pid = pid, "Elevation prompt dismissed");
                }
                Ok(output) => {
                    warn!(
                        pid = pid,
                        status = %output.status,
                        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                        "Elevated kill failed"
                    );
                }
                Err(e) => warn!(pid = pid, error = %e, "Failed to launch elevated kill"),
            }
        });
    }
}

/// `taskkill /F /PID N` or `kill -9 N`.
pub fn kill_command(platform: Platform, pid: u32) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Windows => ("taskkill", command::args(["/F", "/PID", &pid.to_string()])),
        Platform::Darwin | Platform::Linux => ("kill", command::args(["-9", &pid.to_string()])),
    }
}

/// `tasklist /FI "PID eq N" /FO CSV` or `ps -p N -o pid=`.
pub fn exists_command(platform: Platform, pid: u32) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Windows => (
            "tasklist",
            command::args(["/FI", &format!("PID eq {}", pid), "/FO", "CSV"]),
        ),
        Platform::Darwin | Platform::Linux => {
            ("ps", command::args(["-p", &pid.to_string(), "-o", "pid="]))
        }
    }
}

/// tasklist prints `INFO: No tasks are running...` when nothing matches.
pub fn tasklist_reports_pid(stdout: &str, pid: u32) -> bool {
    !stdout.contains("INFO:") && stdout.contains(&pid.to_string())
}

/// Command that performs the kill with elevated privileges.
///
/// Unix re-issues `kill -9` through `sudo`. Windows starts an elevated
/// PowerShell whose script is passed base64-encoded so the label needs no
/// shell quoting.
pub fn elevation_command(
    platform: Platform,
    pid: u32,
    process_label: &str,
) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Windows => {
            let encoded = encode_powershell(&elevation_script(pid, process_label));
            let start = format!(
                "Start-Process powershell -Verb RunAs -ArgumentList '-NoProfile', '-ExecutionPolicy', 'Bypass', '-EncodedCommand', '{}'",
                encoded
            );
            ("powershell", vec!["-Command".to_string(), start])
        }
        Platform::Darwin | Platform::Linux => {
            ("sudo", command::args(["kill", "-9", &pid.to_string()]))
        }
    }
}

/// Status + kill script run inside the elevated PowerShell window.
fn elevation_script(pid: u32, process_label: &str) -> String {
    let label = process_label.replace('\'', "''");
    [
        "$Host.UI.RawUI.WindowTitle = 'PORTY - Admin Kill'".to_string(),
        "Write-Host 'PORTY - Killing process with admin privileges...' -ForegroundColor Yellow"
            .to_string(),
        "Write-Host ''".to_string(),
        format!("Write-Host 'Process: {} (PID: {})' -ForegroundColor Cyan", label, pid),
        "Write-Host ''".to_string(),
        format!("taskkill /F /PID {}", pid),
        "Write-Host ''".to_string(),
        "Write-Host 'Command executed. Check PORTY for result.' -ForegroundColor Green".to_string(),
        "Start-Sleep -Seconds 1".to_string(),
    ]
    .join("\n")
}

/// Encode a script for `powershell -EncodedCommand` (base64 of UTF-16LE).
pub fn encode_powershell(script: &str) -> String {
    let bytes: Vec<u8> = script
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    STANDARD.encode(bytes)
}
