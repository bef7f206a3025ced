//! Profile persistence: `profiles.json` holds the whole store as a JSON array.

use crate::error::ApiError;
use crate::persistence;
use crate::profiles::model::Profile;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

pub trait ProfileStorage: Send + Sync {
    /// Every stored profile in store order. Empty when nothing was saved yet.
    fn read_all(&self) -> Result<Vec<Profile>, ApiError>;

    /// Replace the stored profiles. A failed write keeps the previous state.
    fn write_all(&self, profiles: &[Profile]) -> Result<(), ApiError>;

    fn location(&self) -> String;
}

pub struct JsonProfileStorage {
    path: PathBuf,
}

impl JsonProfileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStorage for JsonProfileStorage {
    fn read_all(&self) -> Result<Vec<Profile>, ApiError> {
        let Some(content) = persistence::read_optional(&self.path)? else {
            return Ok(Vec::new());
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ApiError::Persistence(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_all(&self, profiles: &[Profile]) -> Result<(), ApiError> {
        let content = serde_json::to_string_pretty(profiles)
            .map_err(|e| ApiError::Persistence(format!("Failed to serialize profiles: {}", e)))?;
        persistence::write_atomic(&self.path, content.as_bytes())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Default)]
pub struct MemoryProfileStorage {
    profiles: Mutex<Vec<Profile>>,
    fail_writes: Mutex<bool>,
}

impl MemoryProfileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            fail_writes: Mutex::new(false),
        }
    }

    /// Make every following write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock() = fail;
    }

    pub fn stored(&self) -> Vec<Profile> {
        self.profiles.lock().clone()
    }
}

impl ProfileStorage for MemoryProfileStorage {
    fn read_all(&self) -> Result<Vec<Profile>, ApiError> {
        Ok(self.profiles.lock().clone())
    }

    fn write_all(&self, profiles: &[Profile]) -> Result<(), ApiError> {
        if *self.fail_writes.lock() {
            return Err(ApiError::Persistence("storage is read-only".to_string()));
        }
        *self.profiles.lock() = profiles.to_vec();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
