//! Check command - show what is listening on one port.

use anyhow::Result;
use porty_core::ports::{MetadataSource, SocketProbe};
use porty_core::{ProcessRecord, RegistryBuilder};

pub async fn run<P: SocketProbe, M: MetadataSource>(
    registry: &RegistryBuilder<P, M>,
    port: u16,
) -> Result<()> {
    let record = registry.find_by_port(port).await;
    print!("{}", format_check(port, record.as_ref()));
    Ok(())
}

fn format_check(port: u16, record: Option<&ProcessRecord>) -> String {
    let Some(record) = record else {
        return format!("✓ Port {} is free!\n", port);
    };

    let command = if record.command.is_empty() {
        "N/A"
    } else {
        record.command.as_str()
    };
    let mut out = format!(
        "Port {} is in use:\n\n  PID:     {}\n  Process: {}\n  Command: {}\n",
        port, record.pid, record.process_name, command
    );
    if let Some(full) = &record.full_command {
        out.push_str(&format!("\n  Full command: {}\n", full));
    }
    out.push_str(&format!(
        "\nTip: Use porty --kill {} to free this port\n",
        port
    ));
    out
}
