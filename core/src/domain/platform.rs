//! Host platform families.

use serde::{Deserialize, Serialize};

/// The platform family that decides which OS tools are used.
///
/// Parsers and command builders take this as a value rather than reading
/// `cfg!` themselves, so every family's logic can be exercised on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// Windows family (`netstat`, `wmic`, `tasklist`, `taskkill`).
    Windows,
    /// BSD-style Unix (`lsof`).
    Darwin,
    /// Every other Unix (`ss`).
    Linux,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Darwin => "macOS",
            Platform::Linux => "Linux",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
