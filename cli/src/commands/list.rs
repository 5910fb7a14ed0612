//! List command - show listening processes as JSON or a plain table.

use anyhow::Result;
use porty_core::ports::{MetadataSource, SocketProbe};
use porty_core::{ProcessRecord, RegistryBuilder};

use super::truncate;

/// Print the registry as JSON, or the single record on `port` (`null` when free).
pub async fn json<P: SocketProbe, M: MetadataSource>(
    registry: &RegistryBuilder<P, M>,
    port: Option<u16>,
    include_all: bool,
) -> Result<()> {
    let output = match port {
        Some(port) => serde_json::to_string_pretty(&registry.find_by_port(port).await)?,
        None => serde_json::to_string_pretty(&registry.build(include_all).await)?,
    };
    println!("{}", output);
    Ok(())
}

/// Print the registry as a plain table (used when stdout is not a terminal).
pub async fn table<P: SocketProbe, M: MetadataSource>(
    registry: &RegistryBuilder<P, M>,
    include_all: bool,
) -> Result<()> {
    let records = registry.build(include_all).await;
    print!("{}", format_table(&records));
    Ok(())
}

fn format_table(records: &[ProcessRecord]) -> String {
    if records.is_empty() {
        return "No processes found on listening ports.\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:<8} {:<20} COMMAND\n{}\n",
        "PORT",
        "PID",
        "PROCESS",
        "-".repeat(72)
    );
    for record in records {
        out.push_str(&format!(
            "{:<6} {:<8} {:<20} {}\n",
            record.port,
            record.pid,
            truncate(&record.process_name, 20),
            truncate(&record.command, 40)
        ));
    }
    out.push_str(&format!("\nTotal: {} processes\n", records.len()));
    out
}
