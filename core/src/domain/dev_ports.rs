//! The development port set used by the "dev only" view.

use std::collections::BTreeSet;

/// Ports commonly bound by local development servers.
pub const DEV_PORTS: [u16; 29] = [
    3000, 3001, 3002, 3003, 3004, 3005, // node / rails / next
    4000, 4001, 4200, 4201, // phoenix, angular
    5000, 5001, 5173, 5174, 5175, // flask, vite
    8000, 8001, 8080, 8081, 8082, 8083, // django, generic http
    8888, 9000, 9001, 9200, 9229, // jupyter, php-fpm, elastic, node inspector
    19000, 19001, 19002, // expo
];

/// A development port set, either the built-in list or a user override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevPorts {
    ports: BTreeSet<u16>,
}

impl DevPorts {
    /// Use a custom list instead of [`DEV_PORTS`].
    pub fn custom(ports: impl IntoIterator<Item = u16>) -> Self {
        Self {
            ports: ports.into_iter().collect(),
        }
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }
}

impl Default for DevPorts {
    fn default() -> Self {
        Self::custom(DEV_PORTS)
    }
}
