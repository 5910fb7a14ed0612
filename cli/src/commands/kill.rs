//! Kill command - kill the process on one port.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use porty_core::ports::{MetadataSource, ProcessTerminator, SocketProbe};
use porty_core::RegistryBuilder;
use tracing::info;

/// Kill whatever listens on `port`, asking first unless `force` is set.
///
/// Fails (non-zero exit) only when the kill itself fails, so the command can
/// guard a server start: `porty --mine 3000 && npm run dev`.
pub async fn run<P, M, T>(
    registry: &RegistryBuilder<P, M>,
    terminator: &T,
    port: u16,
    force: bool,
) -> Result<()>
where
    P: SocketProbe,
    M: MetadataSource,
    T: ProcessTerminator,
{
    let Some(record) = registry.find_by_port(port).await else {
        println!("✓ Port {} is already free", port);
        return Ok(());
    };

    if !force {
        println!(
            "{} (PID: {}) on port {}",
            record.process_name, record.pid, port
        );
        if !confirm("Kill this process? (y/n): ")? {
            println!("Kill cancelled");
            return Ok(());
        }
    }

    println!("Killing process {}...", record.pid);
    if terminator.terminate(record.pid).await {
        info!(pid = record.pid, port = port, "Killed from command line");
        println!("✓ Successfully killed process {} on port {}", record.pid, port);
        Ok(())
    } else {
        bail!(
            "Failed to kill process {}. Try running with elevated privileges.",
            record.pid
        )
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes" | "YES")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Yes "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }
}
