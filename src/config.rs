//! Application Configuration
//!
//! Layered configuration for the library and the CLI: compiled defaults, the
//! global `config.toml`, an optional explicit file and `SWITCHYARD__*`
//! environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod storage;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use storage::{StorageConfig, StoragePaths};

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default network timeout applied to every provider client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub client: ClientConfig,
}

/// Settings shared by every provider client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout in seconds (connect + response).
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
