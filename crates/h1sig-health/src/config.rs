//! Liveness endpoint configuration.

use serde::{Deserialize, Serialize};

/// Health server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Enable the liveness endpoint.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Port to listen on (all interfaces).
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_enabled() -> bool {
    true
}

fn default_port() -> u16 {
    10000
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            port: default_port(),
        }
    }
}
