//! Linux `ss` output parser.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::utils::parse_address;
use crate::domain::ListeningSocket;

fn pid_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"pid=(\d+)").ok()).as_ref()
}

fn name_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).ok()).as_ref()
}

/// Parse `ss -ltnp` output lines into listening sockets.
///
/// Expected ss output format:
/// ```text
/// State      Recv-Q     Send-Q              Local Address:Port          Peer Address:Port     Process
/// LISTEN     0          4096           [::ffff:127.0.0.1]:63342                    *:*         users:(("rustrover",pid=53561,fd=54))
/// ```
///
/// Sockets owned by processes the caller may not inspect have no `users:`
/// column and are skipped.
pub(super) fn parse_ss_lines(lines: &[String]) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    for line in lines {
        // Parse columns: [State] [Recv-Q] [Send-Q] [Local Address:Port] [Peer Address:Port] [Process]
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 4 || components[0] != "LISTEN" {
            continue;
        }

        // process names may contain spaces, so take the rest of the line
        let Some(process_part) = line.find("users:").map(|idx| &line[idx..]) else {
            debug!(line = %line, "Skipping ss line without process info");
            continue;
        };

        let Some(pid) = pid_regex()
            .and_then(|re| re.captures(process_part))
            .and_then(|caps| caps[1].parse::<u32>().ok())
        else {
            continue;
        };

        let Some((_, port)) = parse_address(components[3]) else {
            continue;
        };

        let process_name = name_regex()
            .and_then(|re| re.captures(process_part))
            .map(|caps| caps[1].to_string());

        sockets.push(ListeningSocket {
            port,
            pid,
            process_name,
        });
    }

    sockets
}
