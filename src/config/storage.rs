//! StorageConfig and path resolution for the settings and profile files.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const PROFILES_FILE_NAME: &str = "profiles.json";

/// Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `settings.json` and `profiles.json`.
    /// None means `$XDG_CONFIG_HOME/switchyard` or the platform default.
    pub config_dir: Option<PathBuf>,
}

/// Resolved file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    pub profiles_file: PathBuf,
}

impl StoragePaths {
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            settings_file: config_dir.join(SETTINGS_FILE_NAME),
            profiles_file: config_dir.join(PROFILES_FILE_NAME),
            config_dir,
        }
    }
}

impl StorageConfig {
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: Some(config_dir.into()),
        }
    }

    /// Resolve storage paths to actual filesystem locations.
    pub fn resolve_paths(&self) -> Result<StoragePaths, ApiError> {
        let config_dir = match &self.config_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => xdg::app_config_dir()?,
        };
        Ok(StoragePaths::in_dir(config_dir))
    }
}
