//! The live configuration aggregate.

use crate::active::notify::{ChangeNotifier, ChangeReason, ConfigurationChange, Subscription};
use crate::active::storage::{PersistedConfiguration, SettingsStorage};
use crate::error::ApiError;
use crate::provider::{ProviderKind, ProviderSettings, SettingsField};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Selected kind plus the settings of every kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSnapshot {
    pub selected: ProviderKind,
    pub settings: BTreeMap<ProviderKind, ProviderSettings>,
}

impl ConfigurationSnapshot {
    /// Compiled-in defaults for every kind, `Appwrite` selected.
    pub fn defaults() -> Self {
        Self {
            selected: ProviderKind::default(),
            settings: ProviderKind::ALL
                .into_iter()
                .map(|kind| (kind, ProviderSettings::defaults(kind)))
                .collect(),
        }
    }

    pub fn settings_for(&self, kind: ProviderKind) -> ProviderSettings {
        self.settings
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ProviderSettings::defaults(kind))
    }

    fn slot(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        self.settings
            .entry(kind)
            .or_insert_with(|| ProviderSettings::defaults(kind))
    }
}

impl From<&PersistedConfiguration> for ConfigurationSnapshot {
    fn from(persisted: &PersistedConfiguration) -> Self {
        Self {
            selected: persisted.selected,
            settings: persisted.settings_by_kind(),
        }
    }
}

impl From<&ConfigurationSnapshot> for PersistedConfiguration {
    fn from(snapshot: &ConfigurationSnapshot) -> Self {
        PersistedConfiguration::from_parts(snapshot.selected, &snapshot.settings)
    }
}

/// Process-wide configuration: one settings record per provider kind and the
/// selected kind.
///
/// Reads go through an `RwLock`; `save`, `reload` and profile application are
/// additionally serialized by a per-instance mutex so two writers can never
/// interleave a read-modify-write. Subscribers are notified after both locks
/// are released.
pub struct ActiveConfiguration {
    state: RwLock<ConfigurationSnapshot>,
    write_lock: Mutex<()>,
    storage: Arc<dyn SettingsStorage>,
    notifier: ChangeNotifier,
    sequence: AtomicU64,
}

impl ActiveConfiguration {
    /// Load from `storage`, falling back to defaults when nothing usable is stored.
    pub fn load(storage: Arc<dyn SettingsStorage>) -> Self {
        let state = read_or_default(storage.as_ref());
        Self {
            state: RwLock::new(state),
            write_lock: Mutex::new(()),
            storage,
            notifier: ChangeNotifier::new(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn storage_location(&self) -> String {
        self.storage.location()
    }

    pub fn selected(&self) -> ProviderKind {
        self.state.read().selected
    }

    /// Switch the flattened view to `kind`. In memory only: no persist, no notify.
    pub fn set_selected(&self, kind: ProviderKind) {
        let mut state = self.state.write();
        if state.selected != kind {
            tracing::debug!(from = %state.selected, to = %kind, "Selected provider changed");
            state.selected = kind;
        }
    }

    /// Read a field of the selected kind's settings.
    pub fn get_flat(&self, field: &SettingsField) -> Option<String> {
        let state = self.state.read();
        state
            .settings
            .get(&state.selected)
            .and_then(|settings| settings.get(field))
    }

    /// Write a field of the selected kind's settings. Other kinds are never touched.
    pub fn set_flat(&self, field: &SettingsField, value: impl Into<String>) -> Result<(), ApiError> {
        let mut state = self.state.write();
        let selected = state.selected;
        state.slot(selected).set(field, value)
    }

    pub fn endpoint(&self) -> String {
        self.current().endpoint().to_string()
    }

    pub fn identifier(&self) -> String {
        self.current().identifier().to_string()
    }

    pub fn credential(&self) -> String {
        self.current().credential().to_string()
    }

    /// Stored settings of `kind`, selected or not.
    pub fn settings_for(&self, kind: ProviderKind) -> ProviderSettings {
        self.state.read().settings_for(kind)
    }

    /// Settings of the selected kind.
    pub fn current(&self) -> ProviderSettings {
        let state = self.state.read();
        state.settings_for(state.selected)
    }

    pub fn snapshot(&self) -> ConfigurationSnapshot {
        self.state.read().clone()
    }

    /// Overwrite one kind's settings wholesale, in memory.
    pub fn replace_settings(&self, settings: ProviderSettings) {
        let mut state = self.state.write();
        let kind = settings.kind();
        *state.slot(kind) = settings;
    }

    /// Persist every kind plus the selected marker, then notify.
    ///
    /// On failure the error is returned, memory is unchanged and the previous
    /// file stays in place.
    pub fn save(&self) -> Result<(), ApiError> {
        let selected = {
            let _guard = self.write_lock.lock();
            let snapshot = self.state.read().clone();
            self.storage
                .write(&PersistedConfiguration::from(&snapshot))
                .map_err(|e| {
                    tracing::error!(location = %self.storage.location(), error = %e, "Failed to save settings");
                    e
                })?;
            tracing::info!(
                location = %self.storage.location(),
                selected = %snapshot.selected,
                "Saved provider settings"
            );
            snapshot.selected
        };
        self.broadcast(ChangeReason::Saved, selected);
        Ok(())
    }

    /// Re-read storage and replace the contents in place, then notify.
    ///
    /// Like `load`, unreadable state degrades to defaults.
    pub fn reload(&self) {
        let selected = {
            let _guard = self.write_lock.lock();
            let fresh = read_or_default(self.storage.as_ref());
            let selected = fresh.selected;
            *self.state.write() = fresh;
            tracing::info!(location = %self.storage.location(), "Reloaded provider settings");
            selected
        };
        self.broadcast(ChangeReason::Reloaded, selected);
    }

    /// Select `settings.kind()`, overwrite that kind only, persist, and notify
    /// once with `ProfileApplied`. Memory is untouched when the write fails.
    pub(crate) fn apply_profile(&self, settings: &ProviderSettings) -> Result<(), ApiError> {
        let kind = settings.kind();
        {
            let _guard = self.write_lock.lock();
            let mut next = self.state.read().clone();
            next.selected = kind;
            *next.slot(kind) = settings.clone();

            self.storage.write(&PersistedConfiguration::from(&next))?;
            *self.state.write() = next;
        }
        tracing::info!(provider = %kind, "Applied profile settings");
        self.broadcast(ChangeReason::ProfileApplied, kind);
        Ok(())
    }

    /// Register a change callback. Dropping the handle unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ConfigurationChange) + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    fn broadcast(&self, reason: ChangeReason, selected: ProviderKind) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.notifier.notify(&ConfigurationChange {
            reason,
            selected,
            sequence,
        });
    }
}

fn read_or_default(storage: &dyn SettingsStorage) -> ConfigurationSnapshot {
    match storage.read() {
        Ok(Some(persisted)) => ConfigurationSnapshot::from(&persisted),
        Ok(None) => {
            tracing::debug!(location = %storage.location(), "No saved settings, using defaults");
            ConfigurationSnapshot::defaults()
        }
        Err(e) => {
            tracing::warn!(
                location = %storage.location(),
                error = %e,
                "Saved settings are unreadable, using defaults"
            );
            ConfigurationSnapshot::defaults()
        }
    }
}
