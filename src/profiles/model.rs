use crate::provider::{ProviderKind, ProviderSettings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Profile identifier: a UUID v4 string for profiles created here, any
/// non-empty string for imported ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for ids missing from an imported payload.
    pub fn is_unassigned(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for ProfileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProfileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named snapshot of one provider kind's settings.
///
/// Serialized as-is into `profiles.json` and export payloads, credential
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub connection: ProviderSettings,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub(crate) fn new(name: String, description: String, connection: ProviderSettings) -> Self {
        let now = Utc::now();
        Self {
            id: ProfileId::new(),
            name,
            description,
            connection,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.connection.kind()
    }
}
