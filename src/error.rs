//! Error types shared by the settings core, the profile store and the CLI.

use crate::provider::{ProviderCallError, ProviderKind};
use thiserror::Error;

/// Errors surfaced by the public API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input: profile names, unknown settings fields, malformed payloads.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("A profile named '{0}' already exists")]
    DuplicateName(String),

    #[error("Profile limit reached: the store already holds {capacity} profiles")]
    CapacityExceeded { capacity: usize },

    /// Disk read/write failure on the settings or profile file.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Unsupported provider: {0} has no client available")]
    UnsupportedProvider(ProviderKind),

    #[error(transparent)]
    ProviderCall(#[from] ProviderCallError),

    /// A facade call that failed; the message already names provider and operation.
    #[error("{0}")]
    ProviderFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// Short machine-readable code, used by the CLI json output.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::NotFound(_) => "not_found",
            ApiError::DuplicateName(_) => "duplicate_name",
            ApiError::CapacityExceeded { .. } => "capacity_exceeded",
            ApiError::Persistence(_) => "persistence",
            ApiError::UnsupportedProvider(_) => "unsupported_provider",
            ApiError::ProviderCall(_) | ApiError::ProviderFailure(_) => "provider_call",
            ApiError::ConfigError(_) => "config",
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
