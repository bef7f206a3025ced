//! Logging System
//!
//! Structured logging using the `tracing` crate. Level, format and destination
//! come from `LoggingConfig`, each overridable through `SWITCHYARD_LOG*`
//! environment variables.

use crate::config::xdg;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt as stdfmt;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const ENV_LOG: &str = "SWITCHYARD_LOG";
pub const ENV_LOG_FORMAT: &str = "SWITCHYARD_LOG_FORMAT";
pub const ENV_LOG_OUTPUT: &str = "SWITCHYARD_LOG_OUTPUT";
pub const ENV_LOG_FILE: &str = "SWITCHYARD_LOG_FILE";
pub const ENV_LOG_MODULES: &str = "SWITCHYARD_LOG_MODULES";

const LOG_FILE_NAME: &str = "switchyard.log";

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

impl stdfmt::Display for LogFormat {
    fn fmt(&self, f: &mut stdfmt::Formatter<'_>) -> stdfmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Logging configuration, the `[logging]` section of config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,

    /// trace, debug, info, warn, error or off
    pub level: String,

    pub format: LogFormat,

    /// stdout, stderr, file, file+stderr or both
    pub output: String,

    /// Log file when output includes file. `None` means the state directory.
    pub file: Option<PathBuf>,

    /// ANSI colors for text output on a terminal stream
    pub color: bool,

    /// Per-module levels, e.g. `switchyard::provider = "debug"`
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Text,
            // stdout belongs to command output
            output: "file".to_string(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

/// Resolve the log file path with precedence: CLI, SWITCHYARD_LOG_FILE env, config file, default.
pub fn resolve_log_file_path(
    cli_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    let env_file = std::env::var_os(ENV_LOG_FILE).map(PathBuf::from);
    let chosen = [cli_file, env_file, config_file]
        .into_iter()
        .flatten()
        .find(|p| !p.as_os_str().is_empty());
    match chosen {
        Some(path) => Ok(path),
        None => Ok(xdg::state_dir()?.join(LOG_FILE_NAME)),
    }
}

/// Initialize the global subscriber.
///
/// Priority order (highest to lowest):
/// 1. Environment variables (SWITCHYARD_LOG, SWITCHYARD_LOG_FORMAT, ...)
/// 2. Configuration
/// 3. Defaults
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    if !config.enabled {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .try_init()
            .map_err(install_error);
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let writer = build_writer(&output, config.file.clone())?;

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);
    let subscriber = Registry::default().with(filter);

    let installed = match format {
        LogFormat::Json => subscriber.with(layer.json()).try_init(),
        LogFormat::Text => subscriber
            .with(layer.with_ansi(config.color && !output.file))
            .try_init(),
    };
    installed.map_err(install_error)
}

fn install_error(err: impl stdfmt::Display) -> ApiError {
    ApiError::ConfigError(format!("Failed to install logger: {}", err))
}

fn build_writer(
    output: &OutputDestinations,
    config_file: Option<PathBuf>,
) -> Result<BoxMakeWriter, ApiError> {
    if output.file {
        let file = open_log_file(config_file)?;
        return Ok(if output.stderr {
            BoxMakeWriter::new(file.and(std::io::stderr))
        } else {
            BoxMakeWriter::new(file)
        });
    }
    Ok(match (output.stdout, output.stderr) {
        (true, true) => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        (false, true) => BoxMakeWriter::new(std::io::stderr),
        _ => BoxMakeWriter::new(std::io::stdout),
    })
}

fn open_log_file(config_file: Option<PathBuf>) -> Result<Arc<File>, ApiError> {
    let path = resolve_log_file_path(None, config_file)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map(Arc::new)
        .map_err(|e| ApiError::ConfigError(format!("Failed to open log file {}: {}", path.display(), e)))
}

/// SWITCHYARD_LOG replaces the whole filter; otherwise the configured level
/// plus per-module directives from config and SWITCHYARD_LOG_MODULES.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_LOG) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut directives: Vec<(String, String)> = config
        .modules
        .iter()
        .map(|(module, level)| (module.clone(), level.clone()))
        .collect();
    if let Ok(list) = std::env::var(ENV_LOG_MODULES) {
        directives.extend(parse_module_list(&list));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, level) in &directives {
        filter = filter.add_directive(parse_directive(module, level)?);
    }
    Ok(filter)
}

/// `a=debug,b::c=trace` into (module, level) pairs. Malformed items are ignored.
fn parse_module_list(list: &str) -> Vec<(String, String)> {
    list.split(',')
        .filter_map(|item| item.split_once('='))
        .map(|(module, level)| (module.trim().to_string(), level.trim().to_string()))
        .filter(|(module, level)| !module.is_empty() && !level.is_empty())
        .collect()
}

fn parse_directive(module: &str, level: &str) -> Result<Directive, ApiError> {
    format!("{}={}", module, level)
        .parse()
        .map_err(|e| ApiError::ConfigError(format!("Invalid log directive: {}", e)))
}

fn determine_format(config: &LoggingConfig) -> Result<LogFormat, ApiError> {
    match std::env::var(ENV_LOG_FORMAT) {
        Ok(format) => format.parse(),
        Err(_) => Ok(config.format),
    }
}

#[derive(Debug, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

fn determine_output(config: &LoggingConfig) -> Result<OutputDestinations, ApiError> {
    match std::env::var(ENV_LOG_OUTPUT) {
        Ok(output) => parse_output_destinations(&output),
        Err(_) => parse_output_destinations(&config.output),
    }
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, ApiError> {
    let (stdout, stderr, file) = match output.trim() {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        other => {
            return Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                other
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.output, "file");
        assert_eq!(config.file, None);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
        assert!(config.color);
    }

    #[test]
    fn test_parse_output_destinations() {
        let out = parse_output_destinations("stdout").unwrap();
        assert!(out.stdout && !out.stderr && !out.file);

        let out = parse_output_destinations("both").unwrap();
        assert!(out.stdout && out.stderr && !out.file);

        let out = parse_output_destinations("file+stderr").unwrap();
        assert!(!out.stdout && out.stderr && out.file);

        assert!(parse_output_destinations("syslog").is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_module_list_skips_malformed_items() {
        let parsed = parse_module_list("switchyard::profiles=debug, broken ,reqwest=warn,=info");
        assert_eq!(
            parsed,
            vec![
                ("switchyard::profiles".to_string(), "debug".to_string()),
                ("reqwest".to_string(), "warn".to_string()),
            ]
        );
    }

    #[test]
    fn test_resolve_log_file_path_cli_wins() {
        let cli = Some(PathBuf::from("/tmp/cli.log"));
        let config = Some(PathBuf::from("/tmp/config.log"));
        let path = resolve_log_file_path(cli, config).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/cli.log"));
    }

    #[test]
    fn test_resolve_log_file_path_default_fallback() {
        if std::env::var_os(ENV_LOG_FILE).is_some() {
            return;
        }
        if let Ok(path) = resolve_log_file_path(None, None) {
            assert!(path.ends_with(LOG_FILE_NAME));
        }
    }

    #[test]
    fn test_module_directives_parse() {
        assert!(parse_directive("switchyard::profiles", "debug").is_ok());
        assert!(parse_directive("switchyard::provider::clients", "trace").is_ok());
    }
}
