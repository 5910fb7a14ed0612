//! Process registry domain model.

use serde::{Deserialize, Serialize};

use super::label::extract_label;

/// Display name used when the OS does not report one.
pub const UNKNOWN_PROCESS: &str = "Unknown";

// ============================================================================
// ProcessRecord
// ============================================================================

/// One listening `(port, pid)` pair in a registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// Process ID of the listener.
    pub pid: u32,
    /// The listening port number (e.g., 3000, 8080).
    pub port: u16,
    /// Short display name, `"Unknown"` when not reported.
    pub process_name: String,
    /// Short label derived from the full command line, empty when unknown.
    pub command: String,
    /// Complete command line with arguments, when it could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_command: Option<String>,
}

impl ProcessRecord {
    /// Create a record whose metadata has not been resolved yet.
    pub fn new(port: u16, pid: u32, process_name: impl Into<String>) -> Self {
        let process_name = process_name.into();
        Self {
            pid,
            port,
            process_name: if process_name.is_empty() {
                UNKNOWN_PROCESS.to_string()
            } else {
                process_name
            },
            command: String::new(),
            full_command: None,
        }
    }

    /// Attach a full command line and derive the short label from it.
    pub fn with_full_command(mut self, full_command: impl Into<String>) -> Self {
        let full_command = full_command.into();
        self.command = extract_label(&full_command);
        self.full_command = Some(full_command);
        self
    }

    /// Text shown in the command column: the full command line in verbose
    /// mode (falling back to the label), the label otherwise.
    pub fn display_command(&self, verbose: bool) -> &str {
        match (&self.full_command, verbose) {
            (Some(full), true) if !full.is_empty() => full,
            _ => &self.command,
        }
    }

    /// Check if this record matches a filter query.
    ///
    /// Case-insensitive substring match against the port, the pid, the
    /// process name and the command label.
    pub fn matches_filter(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query_lower = query.to_lowercase();
        self.port.to_string().contains(&query_lower)
            || self.pid.to_string().contains(&query_lower)
            || self.process_name.to_lowercase().contains(&query_lower)
            || self.command.to_lowercase().contains(&query_lower)
    }
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            ":{} (PID: {}, Process: {})",
            self.port, self.pid, self.process_name
        )
    }
}

// ============================================================================
// Probe and metadata values
// ============================================================================

/// One listening socket as parsed from a probe line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListeningSocket {
    pub port: u16,
    pub pid: u32,
    /// Process name when the probe reports it (lsof, ss).
    pub process_name: Option<String>,
}

/// Name and command line resolved for one pid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessMetadata {
    pub name: Option<String>,
    pub full_command: Option<String>,
}

/// Apply a filter query to a full snapshot.
///
/// Always run against the unfiltered snapshot so the result depends only on
/// `(records, query)`.
pub fn filter_records(records: &[ProcessRecord], query: &str) -> Vec<ProcessRecord> {
    records
        .iter()
        .filter(|r| r.matches_filter(query))
        .cloned()
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProcessRecord> {
        vec![
            ProcessRecord::new(3000, 100, "node").with_full_command("node server.js"),
            ProcessRecord::new(8080, 200, "nginx").with_full_command("nginx: master process"),
        ]
    }

    #[test]
    fn test_new_defaults_unknown_name() {
        let record = ProcessRecord::new(22, 1, "");
        assert_eq!(record.process_name, UNKNOWN_PROCESS);
        assert_eq!(record.command, "");
        assert!(record.full_command.is_none());
    }

    #[test]
    fn test_with_full_command_derives_label() {
        let record = ProcessRecord::new(5173, 7, "node").with_full_command("node /app/node_modules/.bin/vite");
        assert!(record.command.contains("node"));
        assert_eq!(
            record.full_command.as_deref(),
            Some("node /app/node_modules/.bin/vite")
        );
    }

    #[test]
    fn test_filter_by_port_substring() {
        let result = filter_records(&sample(), "30");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].pid, 100);
    }

    #[test]
    fn test_filter_case_insensitive_name() {
        let result = filter_records(&sample(), "NGINX");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].port, 8080);
    }

    #[test]
    fn test_filter_matches_pid_and_command() {
        assert_eq!(filter_records(&sample(), "200").len(), 1);
        assert_eq!(filter_records(&sample(), "server").len(), 1);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        assert_eq!(filter_records(&sample(), ""), sample());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let once = filter_records(&sample(), "ng");
        let twice = filter_records(&once, "ng");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_display_command_verbose() {
        let record = ProcessRecord::new(3000, 100, "node")
            .with_full_command("/usr/local/bin/node /srv/app/dist/main.js --port 3000");
        assert_eq!(
            record.display_command(true),
            "/usr/local/bin/node /srv/app/dist/main.js --port 3000"
        );
        assert_eq!(record.display_command(false), record.command);

        let bare = ProcessRecord::new(22, 1, "sshd");
        assert_eq!(bare.display_command(true), "");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(&sample()[0]).unwrap();
        assert_eq!(json["processName"], "node");
        assert_eq!(json["fullCommand"], "node server.js");

        let bare = serde_json::to_value(ProcessRecord::new(22, 1, "sshd")).unwrap();
        assert!(bare.get("fullCommand").is_none());
    }
}
