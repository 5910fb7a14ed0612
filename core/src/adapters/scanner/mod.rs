//! Listening socket probes.
//!
//! One OS-native listing command per platform, and one line parser per
//! output format. The parsers are plain functions over text so every format
//! is covered by tests on any host.

mod darwin;
mod linux;
mod utils;
mod windows;

use tracing::debug;

use crate::adapters::command;
use crate::domain::{ListeningSocket, Platform};
use crate::error::Result;
use crate::ports::SocketProbe;

/// The listing command for a platform, as `(program, args)`.
///
/// - Windows: `netstat -ano`
/// - macOS: `lsof -iTCP -sTCP:LISTEN -n -P`
/// - Other Unix: `ss -ltnp`
pub fn probe_command(platform: Platform) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Windows => ("netstat", command::args(["-ano"])),
        Platform::Darwin => ("lsof", command::args(["-iTCP", "-sTCP:LISTEN", "-n", "-P"])),
        Platform::Linux => ("ss", command::args(["-ltnp"])),
    }
}

/// Parse raw probe lines with the scheme for `platform`.
///
/// Lines that are not in listening state, or that lack a port or pid, are
/// dropped. Duplicates are kept; deduplication happens in the registry.
pub fn parse_listening(platform: Platform, lines: &[String]) -> Vec<ListeningSocket> {
    let sockets = match platform {
        Platform::Windows => windows::parse_netstat_lines(lines),
        Platform::Darwin => darwin::parse_lsof_lines(lines),
        Platform::Linux => linux::parse_ss_lines(lines),
    };
    debug!(
        platform = %platform,
        lines = lines.len(),
        sockets = sockets.len(),
        "Parsed probe output"
    );
    sockets
}

/// Socket probe backed by the platform's listing command.
#[derive(Debug, Clone, Copy)]
pub struct CommandProbe {
    platform: Platform,
}

impl CommandProbe {
    /// Create a probe for the current platform.
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketProbe for CommandProbe {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn list_listening_sockets(&self) -> Result<Vec<String>> {
        let (program, args) = probe_command(self.platform);
        let stdout = command::stdout(program, &args).await?;
        Ok(stdout.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_commands() {
        assert_eq!(
            probe_command(Platform::Windows),
            ("netstat", vec!["-ano".to_string()])
        );
        let (program, args) = probe_command(Platform::Darwin);
        assert_eq!(program, "lsof");
        assert_eq!(args.join(" "), "-iTCP -sTCP:LISTEN -n -P");
        let (program, args) = probe_command(Platform::Linux);
        assert_eq!(program, "ss");
        assert_eq!(args.join(" "), "-ltnp");
    }

    #[test]
    fn test_probe_reports_its_platform() {
        assert_eq!(CommandProbe::for_platform(Platform::Darwin).platform(), Platform::Darwin);
        assert_eq!(CommandProbe::new().platform(), Platform::current());
    }
}
