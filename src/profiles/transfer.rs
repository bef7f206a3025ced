//! Export and import payloads.
//!
//! The payload is a pretty-printed JSON array of profiles in the same shape as
//! `profiles.json`. Credentials are included: an export is a local backup, and
//! restoring it must give back working connections.

use crate::error::ApiError;
use crate::profiles::model::Profile;
use serde::Serialize;

/// Outcome of an import: what was added and why the rest was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    imported: Vec<Profile>,
    skipped: Vec<String>,
}

impl ImportReport {
    pub(crate) fn record_imported(&mut self, profile: Profile) {
        self.imported.push(profile);
    }

    pub(crate) fn record_skipped(&mut self, position: usize, name: &str, reason: impl std::fmt::Display) {
        let label = if name.trim().is_empty() {
            format!("entry {}", position + 1)
        } else {
            format!("entry {} ('{}')", position + 1, name.trim())
        };
        self.skipped.push(format!("{}: {}", label, reason));
    }

    pub fn imported_count(&self) -> usize {
        self.imported.len()
    }

    pub fn imported(&self) -> &[Profile] {
        &self.imported
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// One line per skipped entry, or `None` when everything was imported.
    pub fn error_message(&self) -> Option<String> {
        if self.skipped.is_empty() {
            None
        } else {
            Some(self.skipped.join("\n"))
        }
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parse an import payload. Anything but a JSON array of profiles is rejected whole.
pub fn parse_payload(json: &str) -> Result<Vec<Profile>, ApiError> {
    if json.trim().is_empty() {
        return Err(ApiError::Validation("Import payload is empty".to_string()));
    }
    serde_json::from_str(json)
        .map_err(|e| ApiError::Validation(format!("Import payload is not a profile list: {}", e)))
}

pub fn render_payload(profiles: &[Profile]) -> Result<String, ApiError> {
    serde_json::to_string_pretty(profiles)
        .map_err(|e| ApiError::Persistence(format!("Failed to serialize export: {}", e)))
}
