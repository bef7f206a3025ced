//! XDG Base Directory utilities for the settings and profile files.

use crate::error::ApiError;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Directory name under the config home.
pub const APP_DIR: &str = "switchyard";

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
fn config_home() -> Result<PathBuf, ApiError> {
    if let Some(xdg_config_home) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config_home));
    }

    let home = non_empty_env("HOME").ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// Default directory for `settings.json` and `profiles.json`.
///
/// `$XDG_CONFIG_HOME/switchyard` when the variable is set, otherwise the
/// platform config directory from `ProjectDirs`.
pub fn app_config_dir() -> Result<PathBuf, ApiError> {
    if let Some(xdg_config_home) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config_home).join(APP_DIR));
    }

    if let Some(dirs) = project_dirs() {
        return Ok(dirs.config_dir().to_path_buf());
    }

    Ok(config_home()?.join(APP_DIR))
}

/// `config.toml` in the app config directory, if one can be determined.
pub fn global_config_file() -> Option<PathBuf> {
    app_config_dir().ok().map(|dir| dir.join("config.toml"))
}

/// Platform state directory, used for the default log file.
pub fn state_dir() -> Result<PathBuf, ApiError> {
    let dirs = project_dirs().ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform state directory".to_string())
    })?;
    let state = dirs
        .state_dir()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| dirs.data_local_dir().to_path_buf());
    Ok(state)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_DIR)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
