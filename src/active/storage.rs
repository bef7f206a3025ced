//! Settings persistence
//!
//! `SettingsStorage` is the seam between the in-memory configuration and its
//! backing file. The JSON implementation writes `settings.json` atomically;
//! the memory implementation backs tests and embedders without a disk.

use crate::error::ApiError;
use crate::persistence;
use crate::provider::settings::{
    AppwriteSettings, MySqlSettings, NHostSettings, SupabaseSettings,
};
use crate::provider::{ProviderKind, ProviderSettings};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// On-disk shape of `settings.json`.
///
/// ```json
/// {"selected": "Supabase", "providers": {"Appwrite": {...}, "Supabase": {...}}}
/// ```
///
/// Unknown fields are ignored and missing ones take the compiled-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedConfiguration {
    pub selected: ProviderKind,
    pub providers: PersistedProviders,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedProviders {
    #[serde(rename = "Appwrite")]
    pub appwrite: AppwriteSettings,
    #[serde(rename = "Supabase")]
    pub supabase: SupabaseSettings,
    #[serde(rename = "NHost")]
    pub nhost: NHostSettings,
    #[serde(rename = "MySql")]
    pub mysql: MySqlSettings,
}

impl PersistedConfiguration {
    pub fn from_parts(
        selected: ProviderKind,
        settings: &BTreeMap<ProviderKind, ProviderSettings>,
    ) -> Self {
        let mut providers = PersistedProviders::default();
        for value in settings.values() {
            match value {
                ProviderSettings::Appwrite(s) => providers.appwrite = s.clone(),
                ProviderSettings::Supabase(s) => providers.supabase = s.clone(),
                ProviderSettings::NHost(s) => providers.nhost = s.clone(),
                ProviderSettings::MySql(s) => providers.mysql = s.clone(),
            }
        }
        Self {
            selected,
            providers,
        }
    }

    /// Every kind's settings, keyed by kind.
    pub fn settings_by_kind(&self) -> BTreeMap<ProviderKind, ProviderSettings> {
        let providers = &self.providers;
        [
            ProviderSettings::Appwrite(providers.appwrite.clone()),
            ProviderSettings::Supabase(providers.supabase.clone()),
            ProviderSettings::NHost(providers.nhost.clone()),
            ProviderSettings::MySql(providers.mysql.clone()),
        ]
        .into_iter()
        .map(|settings| (settings.kind(), settings))
        .collect()
    }
}

/// Backing store for the active configuration.
pub trait SettingsStorage: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<PersistedConfiguration>, ApiError>;

    /// Replace the stored configuration. A failed write keeps the previous state.
    fn write(&self, state: &PersistedConfiguration) -> Result<(), ApiError>;

    /// Human-readable location, for logs and the CLI.
    fn location(&self) -> String;
}

/// `settings.json` in the config directory.
pub struct JsonSettingsStorage {
    path: PathBuf,
}

impl JsonSettingsStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStorage for JsonSettingsStorage {
    fn read(&self) -> Result<Option<PersistedConfiguration>, ApiError> {
        let Some(content) = persistence::read_optional(&self.path)? else {
            return Ok(None);
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            ApiError::Persistence(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write(&self, state: &PersistedConfiguration) -> Result<(), ApiError> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| ApiError::Persistence(format!("Failed to serialize settings: {}", e)))?;
        persistence::write_atomic(&self.path, content.as_bytes())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory storage. `failing()` builds one whose writes always fail.
#[derive(Default)]
pub struct MemorySettingsStorage {
    state: Mutex<Option<PersistedConfiguration>>,
    fail_writes: bool,
}

impl MemorySettingsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedConfiguration) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            fail_writes: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            state: Mutex::new(None),
            fail_writes: true,
        }
    }

    pub fn stored(&self) -> Option<PersistedConfiguration> {
        self.state.lock().clone()
    }
}

impl SettingsStorage for MemorySettingsStorage {
    fn read(&self) -> Result<Option<PersistedConfiguration>, ApiError> {
        Ok(self.state.lock().clone())
    }

    fn write(&self, state: &PersistedConfiguration) -> Result<(), ApiError> {
        if self.fail_writes {
            return Err(ApiError::Persistence("storage is read-only".to_string()));
        }
        *self.state.lock() = Some(state.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
