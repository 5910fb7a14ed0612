//! Process metadata lookups (`wmic` on Windows, `ps` elsewhere).

use std::collections::HashMap;

use tracing::debug;

use crate::adapters::command;
use crate::domain::{Platform, ProcessMetadata};
use crate::error::{Error, Result};
use crate::ports::MetadataSource;

/// Metadata source backed by the platform's process listing tools.
#[derive(Debug, Clone, Copy)]
pub struct SystemMetadata {
    platform: Platform,
}

impl SystemMetadata {
    /// Create a metadata source for the current platform.
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Default for SystemMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataSource for SystemMetadata {
    async fn query_batch(&self, pids: &[u32]) -> Result<HashMap<u32, ProcessMetadata>> {
        if pids.is_empty() {
            return Ok(HashMap::new());
        }
        let (program, args) = batch_command(self.platform, pids);
        let stdout = command::stdout(program, &args).await?;
        let parsed = match self.platform {
            Platform::Windows => parse_wmic_list(&stdout),
            Platform::Darwin | Platform::Linux => parse_ps_batch(&stdout),
        };
        debug!(requested = pids.len(), resolved = parsed.len(), "Batch metadata query");
        Ok(parsed)
    }

    async fn query_one(&self, pid: u32) -> Result<ProcessMetadata> {
        let (program, args) = single_command(self.platform, pid);
        let stdout = command::stdout(program, &args).await?;

        let metadata = match self.platform {
            Platform::Windows => parse_wmic_list(&stdout)
                .into_values()
                .next()
                .or_else(|| parse_wmic_single(&stdout)),
            Platform::Darwin | Platform::Linux => {
                let full = stdout.trim();
                (!full.is_empty()).then(|| ProcessMetadata {
                    name: None,
                    full_command: Some(full.to_string()),
                })
            }
        };

        metadata.ok_or(Error::MetadataUnavailable { pid })
    }
}

/// Batch query for several pids.
///
/// - Windows: `wmic process where "(ProcessId=1 or ProcessId=2)" get ProcessId,Name,CommandLine /format:list`
/// - Unix: `ps -o pid=,command= -p 1,2`
pub fn batch_command(platform: Platform, pids: &[u32]) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Windows => {
            let filter = pids
                .iter()
                .map(|pid| format!("ProcessId={}", pid))
                .collect::<Vec<_>>()
                .join(" or ");
            (
                "wmic",
                vec![
                    "process".to_string(),
                    "where".to_string(),
                    format!("({})", filter),
                    "get".to_string(),
                    "ProcessId,Name,CommandLine".to_string(),
                    "/format:list".to_string(),
                ],
            )
        }
        Platform::Darwin | Platform::Linux => {
            let list = pids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            ("ps", vec!["-o".to_string(), "pid=,command=".to_string(), "-p".to_string(), list])
        }
    }
}

/// Per-pid fallback query.
///
/// - Windows: `wmic process where ProcessId=N get Name,CommandLine /format:list`
/// - Unix: `ps -p N -o command=`
pub fn single_command(platform: Platform, pid: u32) -> (&'static str, Vec<String>) {
    match platform {
        Platform::Windows => (
            "wmic",
            vec![
                "process".to_string(),
                "where".to_string(),
                format!("ProcessId={}", pid),
                "get".to_string(),
                "Name,CommandLine".to_string(),
                "/format:list".to_string(),
            ],
        ),
        Platform::Darwin | Platform::Linux => (
            "ps",
            vec!["-p".to_string(), pid.to_string(), "-o".to_string(), "command=".to_string()],
        ),
    }
}

/// Parse `wmic ... /format:list` output.
///
/// Each process is a block of `Key=Value` lines; blocks are separated by
/// blank lines. wmic orders keys alphabetically, so a block is only complete
/// once it ends, not when `ProcessId=` is seen.
fn parse_wmic_list(output: &str) -> HashMap<u32, ProcessMetadata> {
    let mut results = HashMap::new();
    let mut block: HashMap<&str, &str> = HashMap::new();

    let mut flush = |block: &mut HashMap<&str, &str>| {
        if let Some(pid) = block.get("ProcessId").and_then(|v| v.parse::<u32>().ok()) {
            results.insert(pid, metadata_from_block(block));
        }
        block.clear();
    };

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush(&mut block);
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if block.contains_key(key) {
            flush(&mut block);
        }
        block.insert(key, value.trim());
    }
    flush(&mut block);

    results
}

/// Parse a per-pid wmic answer, which has no `ProcessId` key.
fn parse_wmic_single(output: &str) -> Option<ProcessMetadata> {
    let block: HashMap<&str, &str> = output
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(k, v)| (k, v.trim()))
        .collect();
    if block.is_empty() {
        return None;
    }
    Some(metadata_from_block(&block))
}

fn metadata_from_block(block: &HashMap<&str, &str>) -> ProcessMetadata {
    let non_empty = |key: &str| {
        block
            .get(key)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    };
    ProcessMetadata {
        name: non_empty("Name"),
        full_command: non_empty("CommandLine"),
    }
}

/// Parse `ps -o pid=,command=` output: a pid, whitespace, the command line.
fn parse_ps_batch(output: &str) -> HashMap<u32, ProcessMetadata> {
    let mut results = HashMap::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Split into PID and command (only first split)
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let Some(pid) = parts.next().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let command = parts.next().map(str::trim).unwrap_or_default();

        results.insert(
            pid,
            ProcessMetadata {
                name: None,
                full_command: (!command.is_empty()).then(|| command.to_string()),
            },
        );
    }

    results
}
