//! Lowest-precedence layer of every configuration build.

use crate::config::DEFAULT_TIMEOUT_SECS;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the compiled defaults that are not plain serde defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("client.timeout_secs", DEFAULT_TIMEOUT_SECS)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")
}
