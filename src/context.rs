//! Application context
//!
//! Owns the process-wide `ActiveConfiguration`, `ProfileStore` and
//! `ProviderClientFactory`. Each is built once, on first access, from the
//! resolved storage paths; every later access returns the same instance.

use crate::active::{ActiveConfiguration, JsonSettingsStorage};
use crate::concurrency::OnceSlot;
use crate::config::{AppConfig, StoragePaths};
use crate::error::ApiError;
use crate::profiles::{JsonProfileStorage, ProfileStore};
use crate::provider::ProviderClientFactory;
use std::sync::Arc;

pub struct AppContext {
    config: AppConfig,
    paths: StoragePaths,
    active: OnceSlot<ActiveConfiguration>,
    profiles: OnceSlot<ProfileStore>,
    factory: OnceSlot<ProviderClientFactory>,
}

impl AppContext {
    /// Context with file locations resolved from `config.storage`.
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let paths = config.storage.resolve_paths()?;
        Ok(Self::with_paths(config, paths))
    }

    pub fn with_paths(config: AppConfig, paths: StoragePaths) -> Self {
        tracing::debug!(config_dir = %paths.config_dir.display(), "Resolved storage paths");
        Self {
            config,
            paths,
            active: OnceSlot::new(),
            profiles: OnceSlot::new(),
            factory: OnceSlot::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// The process-wide configuration, loaded from `settings.json` on first use.
    pub fn active_configuration(&self) -> Arc<ActiveConfiguration> {
        self.active.get_or_init(|| {
            let storage = Arc::new(JsonSettingsStorage::new(&self.paths.settings_file));
            ActiveConfiguration::load(storage)
        })
    }

    /// The profile store, opened from `profiles.json` on first use.
    pub fn profile_store(&self) -> Result<Arc<ProfileStore>, ApiError> {
        self.profiles.get_or_try_init(|| {
            let storage = Arc::new(JsonProfileStorage::new(&self.paths.profiles_file));
            ProfileStore::open(storage, self.active_configuration())
        })
    }

    pub fn client_factory(&self) -> Arc<ProviderClientFactory> {
        self.factory.get_or_init(|| {
            ProviderClientFactory::new(self.active_configuration(), self.config.client.clone())
        })
    }
}
