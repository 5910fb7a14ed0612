//! Windows `netstat -ano` output parser.

use super::utils::parse_address;
use crate::domain::ListeningSocket;

/// Parse the output of `netstat -ano` to extract listening TCP sockets.
///
/// Example output:
/// ```text
/// Active Connections
///
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
///   TCP    [::]:445               [::]:0                 LISTENING       4
///   TCP    127.0.0.1:3000         0.0.0.0:0              LISTENING       5432
/// ```
///
/// netstat does not name processes; names come from the metadata query.
pub(super) fn parse_netstat_lines(lines: &[String]) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    for line in lines {
        if !line.contains("LISTENING") {
            continue;
        }

        // Expected format: Proto, Local Address, Foreign Address, State, PID
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }

        let pid: u32 = match parts[4].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        let Some((_, port)) = parse_address(parts[1]) else {
            continue;
        };

        sockets.push(ListeningSocket {
            port,
            pid,
            process_name: None,
        });
    }

    sockets
}
