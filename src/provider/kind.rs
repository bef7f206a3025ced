use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend provider kinds known to the settings core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ProviderKind {
    /// Appwrite document database (REST).
    #[default]
    Appwrite,
    /// Supabase / PostgREST.
    Supabase,
    /// NHost, served through Hasura GraphQL.
    NHost,
    /// Plain MySQL server.
    MySql,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Appwrite,
        ProviderKind::Supabase,
        ProviderKind::NHost,
        ProviderKind::MySql,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ProviderKind::Appwrite => "appwrite",
            ProviderKind::Supabase => "supabase",
            ProviderKind::NHost => "nhost",
            ProviderKind::MySql => "mysql",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Appwrite => "Appwrite",
            ProviderKind::Supabase => "Supabase",
            ProviderKind::NHost => "NHost",
            ProviderKind::MySql => "MySql",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| {
                ApiError::Validation(format!(
                    "Invalid provider kind: {}. Must be appwrite, supabase, nhost, or mysql",
                    s
                ))
            })
    }
}
