//! macOS `lsof` output parser.

use tracing::debug;

use super::utils::parse_address;
use crate::domain::ListeningSocket;

/// Parse lsof output lines into listening sockets.
///
/// Expected lsof output format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
pub(super) fn parse_lsof_lines(lines: &[String]) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    // Skip header line
    for line in lines.iter().skip(1) {
        // Parse lsof columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 9 {
            continue;
        }

        // A trailing state marker other than LISTEN means an established
        // or closing socket slipped through.
        if let Some(state) = components.get(9) {
            if state.starts_with('(') && *state != "(LISTEN)" {
                continue;
            }
        }

        let pid: u32 = match components[1].parse() {
            Ok(p) => p,
            Err(_) => {
                debug!(line = %line, "Skipping lsof line without pid");
                continue;
            }
        };

        let Some((_, port)) = parse_address(components[8]) else {
            continue;
        };

        // Unescape process name
        let process_name = components[0]
            .replace("\\x20", " ") // Space
            .replace("\\x2f", "/"); // Slash

        sockets.push(ListeningSocket {
            port,
            pid,
            process_name: Some(process_name),
        });
    }

    sockets
}
