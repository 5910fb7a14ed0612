//! Configuration management for session defaults.
//!
//! Stores configuration in JSON format at `~/.porty/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::SessionSettings;
use crate::domain::DevPorts;
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Start with all listening ports instead of dev ports only.
    #[serde(default = "default_true")]
    pub show_all_ports: bool,

    /// Upper bound on table rows, whatever the terminal height.
    #[serde(default = "default_max_visible_rows")]
    pub max_visible_rows: usize,

    /// Delay before reloading after a successful kill.
    #[serde(default = "default_kill_settle_delay_ms")]
    pub kill_settle_delay_ms: u64,

    /// Delay before the escalation message switches to "checking".
    #[serde(default = "default_elevation_status_delay_ms")]
    pub elevation_status_delay_ms: u64,

    /// Delay before polling whether the escalated target is gone.
    #[serde(default = "default_elevation_verify_delay_ms")]
    pub elevation_verify_delay_ms: u64,

    /// Keep pids whose batch kill failed selected for another try.
    #[serde(default = "default_true")]
    pub retain_failed_selection: bool,

    /// Replaces the built-in development port list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_ports: Option<Vec<u16>>,
}

fn default_true() -> bool {
    true
}

fn default_max_visible_rows() -> usize {
    15
}

fn default_kill_settle_delay_ms() -> u64 {
    500
}

fn default_elevation_status_delay_ms() -> u64 {
    1500
}

fn default_elevation_verify_delay_ms() -> u64 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_all_ports: true,
            max_visible_rows: default_max_visible_rows(),
            kill_settle_delay_ms: default_kill_settle_delay_ms(),
            elevation_status_delay_ms: default_elevation_status_delay_ms(),
            elevation_verify_delay_ms: default_elevation_verify_delay_ms(),
            retain_failed_selection: true,
            dev_ports: None,
        }
    }
}

impl Config {
    /// Session tunables derived from this config.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            include_all_ports: self.show_all_ports,
            max_visible_rows: self.max_visible_rows,
            kill_settle_delay: Duration::from_millis(self.kill_settle_delay_ms),
            elevation_status_delay: Duration::from_millis(self.elevation_status_delay_ms),
            elevation_verify_delay: Duration::from_millis(self.elevation_verify_delay_ms),
            retain_failed_selection: self.retain_failed_selection,
        }
    }

    /// The configured dev port set, or the built-in one.
    pub fn dev_ports(&self) -> DevPorts {
        match &self.dev_ports {
            Some(ports) => DevPorts::custom(ports.iter().copied()),
            None => DevPorts::default(),
        }
    }
}

/// Configuration store for managing settings.
///
/// Handles reading and writing configuration to `~/.porty/config.json`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.porty/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_dir = home.join(".porty");
        let config_path = config_dir.join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        let config_dir = self.config_dir();
        fs::create_dir_all(&config_dir)
            .await
            .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Load, apply `change`, and save.
    pub async fn update(&self, change: impl FnOnce(&mut Config)) -> Result<Config> {
        let mut config = self.load().await?;
        change(&mut config);
        self.save(&config).await?;
        Ok(config)
    }
}
