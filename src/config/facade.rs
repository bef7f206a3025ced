//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::AppConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment, plus `explicit` when given.
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
        MergeService::load(explicit)
    }
}
