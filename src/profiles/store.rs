//! ProfileStore: the bounded, persisted collection of named profiles.

use crate::active::ActiveConfiguration;
use crate::error::ApiError;
use crate::profiles::model::{Profile, ProfileId};
use crate::profiles::name::{normalize, ProfileName};
use crate::profiles::storage::ProfileStorage;
use crate::profiles::transfer::{self, ImportReport};
use crate::provider::ProviderSettings;
use chrono::Utc;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::sync::Arc;

/// Maximum number of stored profiles.
pub const PROFILE_CAPACITY: usize = 100;

/// Named snapshots of provider settings.
///
/// Every mutation builds the next list on a copy, writes it, and only then
/// swaps it in, so a failed write changes nothing. Mutations are serialized by
/// the store mutex, which is held across the write.
pub struct ProfileStore {
    profiles: Mutex<Vec<Profile>>,
    storage: Arc<dyn ProfileStorage>,
    active: Arc<ActiveConfiguration>,
}

impl ProfileStore {
    /// Open the store backed by `storage`.
    ///
    /// A missing file is an empty store; an unreadable one, or one holding
    /// more than `PROFILE_CAPACITY` profiles, is an error, so a later write can
    /// never silently replace profiles the store did not keep.
    pub fn open(
        storage: Arc<dyn ProfileStorage>,
        active: Arc<ActiveConfiguration>,
    ) -> Result<Self, ApiError> {
        let profiles = storage.read_all()?;
        if profiles.len() > PROFILE_CAPACITY {
            tracing::error!(
                location = %storage.location(),
                count = profiles.len(),
                "Profile file holds more than {} profiles",
                PROFILE_CAPACITY
            );
            return Err(ApiError::Persistence(format!(
                "{} holds {} profiles, more than the limit of {}",
                storage.location(),
                profiles.len(),
                PROFILE_CAPACITY
            )));
        }
        tracing::debug!(location = %storage.location(), count = profiles.len(), "Opened profile store");
        Ok(Self {
            profiles: Mutex::new(profiles),
            storage,
            active,
        })
    }

    pub fn capacity(&self) -> usize {
        PROFILE_CAPACITY
    }

    pub fn count(&self) -> usize {
        self.profiles.lock().len()
    }

    pub fn can_add_more(&self) -> bool {
        self.count() < PROFILE_CAPACITY
    }

    /// All profiles in insertion order.
    pub fn list(&self) -> Vec<Profile> {
        self.profiles.lock().clone()
    }

    pub fn get(&self, id: &ProfileId) -> Option<Profile> {
        self.profiles.lock().iter().find(|p| &p.id == id).cloned()
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Option<Profile> {
        let wanted = normalize(name);
        self.profiles
            .lock()
            .iter()
            .find(|p| normalize(&p.name) == wanted)
            .cloned()
    }

    /// Snapshot the selected kind's current settings under `name`.
    pub fn create_from_active(&self, name: &str, description: &str) -> Result<Profile, ApiError> {
        self.create(name, description, self.active.current())
    }

    /// Store `settings` under `name`.
    pub fn create(
        &self,
        name: &str,
        description: &str,
        settings: ProviderSettings,
    ) -> Result<Profile, ApiError> {
        let name = ProfileName::new(name)?;

        let mut profiles = self.profiles.lock();
        if let Some(existing) = find_name_clash(&profiles, &name, None) {
            return Err(ApiError::DuplicateName(existing.name.clone()));
        }
        if profiles.len() >= PROFILE_CAPACITY {
            return Err(ApiError::CapacityExceeded {
                capacity: PROFILE_CAPACITY,
            });
        }

        let profile = Profile::new(name.into_string(), description.trim().to_string(), settings);
        let mut next = profiles.clone();
        next.push(profile.clone());
        self.commit(&mut profiles, next)?;

        tracing::info!(
            profile = %profile.id,
            name = %profile.name,
            provider = %profile.kind(),
            "Created profile"
        );
        Ok(profile)
    }

    /// Apply a profile to the active configuration: select its kind, overwrite
    /// that kind's settings, save, and broadcast one `ProfileApplied` change.
    pub fn load(&self, id: &ProfileId) -> Result<Profile, ApiError> {
        let profile = self
            .get(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        self.active.apply_profile(&profile.connection)?;
        tracing::info!(profile = %profile.id, name = %profile.name, "Loaded profile");
        Ok(profile)
    }

    /// Edit path: replace the stored profile with the same id.
    ///
    /// The name is re-validated against every other profile; `created_at` is
    /// kept and `updated_at` refreshed.
    pub fn save(&self, profile: Profile) -> Result<Profile, ApiError> {
        let name = ProfileName::new(&profile.name)?;

        let mut profiles = self.profiles.lock();
        let index = profiles
            .iter()
            .position(|p| p.id == profile.id)
            .ok_or_else(|| ApiError::NotFound(profile.id.to_string()))?;
        if let Some(existing) = find_name_clash(&profiles, &name, Some(&profile.id)) {
            return Err(ApiError::DuplicateName(existing.name.clone()));
        }

        let previous = &profiles[index];
        let updated = Profile {
            name: name.into_string(),
            description: profile.description.trim().to_string(),
            created_at: previous.created_at,
            updated_at: Utc::now().max(previous.updated_at),
            ..profile
        };
        let mut next = profiles.clone();
        next[index] = updated.clone();
        self.commit(&mut profiles, next)?;

        tracing::info!(profile = %updated.id, name = %updated.name, "Updated profile");
        Ok(updated)
    }

    pub fn rename(&self, id: &ProfileId, name: &str) -> Result<Profile, ApiError> {
        let mut profile = self
            .get(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        profile.name = name.to_string();
        self.save(profile)
    }

    pub fn delete(&self, id: &ProfileId) -> Result<(), ApiError> {
        let mut profiles = self.profiles.lock();
        let index = profiles
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        let mut next = profiles.clone();
        let removed = next.remove(index);
        self.commit(&mut profiles, next)?;

        tracing::info!(profile = %removed.id, name = %removed.name, "Deleted profile");
        Ok(())
    }

    /// Import a JSON array of profiles.
    ///
    /// The payload must parse as a whole before anything is applied. Entries
    /// are then checked one by one against the store as it grows: invalid
    /// names, names already taken (including earlier entries of the same
    /// payload) and entries past capacity are skipped and reported. Ids are
    /// kept when free, otherwise replaced; timestamps are kept.
    pub fn import(&self, json: &str) -> Result<ImportReport, ApiError> {
        let entries = transfer::parse_payload(json)?;

        let mut profiles = self.profiles.lock();
        let mut next = profiles.clone();
        let mut names: HashSet<String> = next.iter().map(|p| normalize(&p.name)).collect();
        let mut ids: HashSet<ProfileId> = next.iter().map(|p| p.id.clone()).collect();
        let mut report = ImportReport::default();

        for (position, entry) in entries.into_iter().enumerate() {
            let name = match ProfileName::new(&entry.name) {
                Ok(name) => name,
                Err(e) => {
                    report.record_skipped(position, &entry.name, e);
                    continue;
                }
            };
            if names.contains(&name.normalized()) {
                report.record_skipped(
                    position,
                    &entry.name,
                    ApiError::DuplicateName(name.to_string()),
                );
                continue;
            }
            if next.len() >= PROFILE_CAPACITY {
                report.record_skipped(
                    position,
                    &entry.name,
                    ApiError::CapacityExceeded {
                        capacity: PROFILE_CAPACITY,
                    },
                );
                continue;
            }

            let id = if entry.id.is_unassigned() || ids.contains(&entry.id) {
                ProfileId::new()
            } else {
                entry.id.clone()
            };
            let profile = Profile {
                id,
                name: name.into_string(),
                description: entry.description.trim().to_string(),
                ..entry
            };
            names.insert(normalize(&profile.name));
            ids.insert(profile.id.clone());
            next.push(profile.clone());
            report.record_imported(profile);
        }

        if report.imported_count() > 0 {
            self.commit(&mut profiles, next)?;
        }
        tracing::info!(
            imported = report.imported_count(),
            skipped = report.skipped_count(),
            "Imported profiles"
        );
        Ok(report)
    }

    /// Export the whole store (`None` or empty) or exactly the given ids, in
    /// store order. Any unknown id fails the export.
    pub fn export(&self, ids: Option<&[ProfileId]>) -> Result<String, ApiError> {
        let profiles = self.profiles.lock();
        let selected: Vec<Profile> = match ids {
            None => profiles.clone(),
            Some([]) => profiles.clone(),
            Some(ids) => {
                if let Some(missing) = ids.iter().find(|id| !profiles.iter().any(|p| &p.id == *id)) {
                    return Err(ApiError::NotFound(missing.to_string()));
                }
                profiles
                    .iter()
                    .filter(|p| ids.contains(&p.id))
                    .cloned()
                    .collect()
            }
        };
        tracing::debug!(count = selected.len(), "Exporting profiles");
        transfer::render_payload(&selected)
    }

    fn commit(
        &self,
        profiles: &mut MutexGuard<'_, Vec<Profile>>,
        next: Vec<Profile>,
    ) -> Result<(), ApiError> {
        self.storage.write_all(&next).map_err(|e| {
            tracing::error!(location = %self.storage.location(), error = %e, "Failed to save profiles");
            e
        })?;
        **profiles = next;
        Ok(())
    }
}

fn find_name_clash<'a>(
    profiles: &'a [Profile],
    name: &ProfileName,
    except: Option<&ProfileId>,
) -> Option<&'a Profile> {
    let wanted = name.normalized();
    profiles
        .iter()
        .filter(|p| Some(&p.id) != except)
        .find(|p| normalize(&p.name) == wanted)
}
