//! porty - find and kill processes listening on ports
//!
//! Interactive by default; `--list`, `--check`, `--kill` and `--mine` are
//! one-shot modes meant for scripts.

mod commands;
mod logging;
mod tui;

use clap::Parser;
use porty_core::{Config, ConfigStore, RegistryBuilder, SystemTerminator};
use tracing::warn;

#[derive(Parser)]
#[command(name = "porty")]
#[command(author, version, about = "Find and kill processes listening on ports")]
struct Cli {
    /// Show only development ports
    #[arg(short, long)]
    dev: bool,

    /// Output the process list as JSON, or only the process on PORT
    #[arg(short, long, value_name = "PORT", num_args = 0..=1)]
    list: Option<Option<u16>>,

    /// Check what is running on a port
    #[arg(short, long, value_name = "PORT", visible_alias = "wtf")]
    check: Option<u16>,

    /// Kill the process on a port
    #[arg(short, long, value_name = "PORT")]
    kill: Option<u16>,

    /// Kill the process on a port without confirmation
    #[arg(short, long, value_name = "PORT")]
    mine: Option<u16>,

    /// Skip confirmation when killing
    #[arg(short, long)]
    force: bool,

    /// Disable the interactive TUI and print a table
    #[arg(long)]
    no_tui: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = ConfigStore::new().ok();
    let interactive = cli.list.is_none()
        && cli.check.is_none()
        && cli.kill.is_none()
        && cli.mine.is_none()
        && !cli.no_tui
        && atty::is(atty::Stream::Stdout);

    let _guard = match (&store, interactive) {
        (Some(store), true) => logging::init_file(&store.config_dir()),
        _ => {
            logging::init_stderr();
            None
        }
    };

    let config = match &store {
        Some(store) => store.load().await.unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable config");
            Config::default()
        }),
        None => Config::default(),
    };
    let include_all = include_all_ports(cli.dev, &config);
    let registry = RegistryBuilder::system().with_dev_ports(config.dev_ports());

    if let Some(port) = cli.list {
        return commands::list::json(&registry, port, include_all).await;
    }
    if let Some(port) = cli.check {
        return commands::check::run(&registry, port).await;
    }
    if let Some(port) = cli.mine {
        return commands::kill::run(&registry, &SystemTerminator::new(), port, true).await;
    }
    if let Some(port) = cli.kill {
        return commands::kill::run(&registry, &SystemTerminator::new(), port, cli.force).await;
    }

    if interactive {
        let mut settings = config.session_settings();
        settings.include_all_ports = include_all;
        tui::run(settings, registry, store).await
    } else {
        commands::list::table(&registry, include_all).await
    }
}

/// `--dev` wins; otherwise the saved `showAllPorts` decides.
fn include_all_ports(dev: bool, config: &Config) -> bool {
    !dev && config.show_all_ports
}
