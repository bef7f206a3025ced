//! Global config file source: `$XDG_CONFIG_HOME/switchyard/config.toml`, optional.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::global_config_file() {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Adding global config file source");
            Ok(builder.add_source(File::from(path).required(false)))
        }
        None => Ok(builder),
    }
}
