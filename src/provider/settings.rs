//! Per-provider settings records.
//!
//! Every kind stores its own record with provider-native field names. The
//! normalized capability set (endpoint, identifier, credential) is resolved
//! through explicit per-kind accessors, so reading or writing a flattened field
//! always lands on exactly one struct field of exactly one kind.

use crate::error::ApiError;
use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Appwrite project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub bucket_id: String,
    /// Entity name to collection id. Entities without an entry use their own name.
    pub collections: BTreeMap<String, String>,
}

impl Default for AppwriteSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: String::new(),
            api_key: String::new(),
            database_id: String::new(),
            bucket_id: String::new(),
            collections: BTreeMap::new(),
        }
    }
}

/// Supabase project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    pub url: String,
    pub project_ref: String,
    pub api_key: String,
    pub schema: String,
    pub bucket_id: String,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            url: "https://your-project.supabase.co".to_string(),
            project_ref: String::new(),
            api_key: String::new(),
            schema: "public".to_string(),
            bucket_id: String::new(),
        }
    }
}

/// NHost project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NHostSettings {
    /// Base URL override. Empty means derive it from subdomain and region.
    pub endpoint: String,
    pub subdomain: String,
    pub admin_secret: String,
    pub region: String,
    pub graphql_path: String,
}

impl Default for NHostSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            subdomain: "local".to_string(),
            admin_secret: String::new(),
            region: "local".to_string(),
            graphql_path: "/v1/graphql".to_string(),
        }
    }
}

impl NHostSettings {
    /// Full GraphQL URL, derived from subdomain and region when no endpoint is set.
    pub fn graphql_url(&self) -> String {
        let base = if self.endpoint.trim().is_empty() {
            format!(
                "https://{}.hasura.{}.nhost.run",
                self.subdomain.trim(),
                self.region.trim()
            )
        } else {
            self.endpoint.trim().trim_end_matches('/').to_string()
        };
        let path = self.graphql_path.trim();
        if path.is_empty() || base.ends_with(path) {
            base
        } else if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

/// MySQL server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MySqlSettings {
    pub host: String,
    pub database: String,
    pub password: String,
    pub username: String,
    pub port: String,
}

impl Default for MySqlSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            database: String::new(),
            password: String::new(),
            username: "root".to_string(),
            port: "3306".to_string(),
        }
    }
}

/// Settings of one provider kind, tagged with that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "settings")]
pub enum ProviderSettings {
    Appwrite(AppwriteSettings),
    Supabase(SupabaseSettings),
    NHost(NHostSettings),
    MySql(MySqlSettings),
}

/// A field of the flattened settings view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SettingsField {
    Endpoint,
    Identifier,
    Credential,
    /// Kind-specific field, addressed by its settings name.
    Extra(String),
}

impl FromStr for SettingsField {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Settings field name cannot be empty".to_string()));
        }
        Ok(match name.to_ascii_lowercase().as_str() {
            "endpoint" | "url" | "endpoint_url" => SettingsField::Endpoint,
            "identifier" | "id" => SettingsField::Identifier,
            "credential" | "secret" => SettingsField::Credential,
            _ => SettingsField::Extra(name.to_string()),
        })
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsField::Endpoint => f.write_str("endpoint"),
            SettingsField::Identifier => f.write_str("identifier"),
            SettingsField::Credential => f.write_str("credential"),
            SettingsField::Extra(name) => f.write_str(name),
        }
    }
}

const COLLECTION_PREFIX: &str = "collection.";

impl ProviderSettings {
    /// Compiled-in defaults for `kind`.
    pub fn defaults(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Appwrite => ProviderSettings::Appwrite(AppwriteSettings::default()),
            ProviderKind::Supabase => ProviderSettings::Supabase(SupabaseSettings::default()),
            ProviderKind::NHost => ProviderSettings::NHost(NHostSettings::default()),
            ProviderKind::MySql => ProviderSettings::MySql(MySqlSettings::default()),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderSettings::Appwrite(_) => ProviderKind::Appwrite,
            ProviderSettings::Supabase(_) => ProviderKind::Supabase,
            ProviderSettings::NHost(_) => ProviderKind::NHost,
            ProviderSettings::MySql(_) => ProviderKind::MySql,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ProviderSettings::Appwrite(s) => &s.endpoint,
            ProviderSettings::Supabase(s) => &s.url,
            ProviderSettings::NHost(s) => &s.endpoint,
            ProviderSettings::MySql(s) => &s.host,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            ProviderSettings::Appwrite(s) => &s.project_id,
            ProviderSettings::Supabase(s) => &s.project_ref,
            ProviderSettings::NHost(s) => &s.subdomain,
            ProviderSettings::MySql(s) => &s.database,
        }
    }

    pub fn credential(&self) -> &str {
        match self {
            ProviderSettings::Appwrite(s) => &s.api_key,
            ProviderSettings::Supabase(s) => &s.api_key,
            ProviderSettings::NHost(s) => &s.admin_secret,
            ProviderSettings::MySql(s) => &s.password,
        }
    }

    /// Names accepted as `SettingsField::Extra` for `kind`.
    ///
    /// Appwrite additionally accepts `collection.<entity>`.
    pub fn extra_field_names(kind: ProviderKind) -> &'static [&'static str] {
        match kind {
            ProviderKind::Appwrite => &["database_id", "bucket_id"],
            ProviderKind::Supabase => &["schema", "bucket_id"],
            ProviderKind::NHost => &["region", "graphql_path"],
            ProviderKind::MySql => &["username", "port"],
        }
    }

    /// Read one flattened field. `None` for extras this kind does not have.
    pub fn get(&self, field: &SettingsField) -> Option<String> {
        match field {
            SettingsField::Endpoint => Some(self.endpoint().to_string()),
            SettingsField::Identifier => Some(self.identifier().to_string()),
            SettingsField::Credential => Some(self.credential().to_string()),
            SettingsField::Extra(name) => self.extra_slot(name).map(|v| v.to_string()),
        }
    }

    /// Write one flattened field of this kind.
    pub fn set(&mut self, field: &SettingsField, value: impl Into<String>) -> Result<(), ApiError> {
        let value = value.into();
        let kind = self.kind();
        match field {
            SettingsField::Endpoint => *self.endpoint_mut() = value,
            SettingsField::Identifier => *self.identifier_mut() = value,
            SettingsField::Credential => *self.credential_mut() = value,
            SettingsField::Extra(name) => {
                if let ProviderSettings::Appwrite(s) = self {
                    if let Some(entity) = name.strip_prefix(COLLECTION_PREFIX) {
                        if entity.trim().is_empty() {
                            return Err(ApiError::Validation(
                                "Collection field requires an entity name".to_string(),
                            ));
                        }
                        if value.is_empty() {
                            s.collections.remove(entity);
                        } else {
                            s.collections.insert(entity.to_string(), value);
                        }
                        return Ok(());
                    }
                }
                let slot = self.extra_slot_mut(name).ok_or_else(|| {
                    ApiError::Validation(format!(
                        "{} settings have no field '{}' (extra fields: {})",
                        kind,
                        name,
                        Self::extra_field_names(kind).join(", ")
                    ))
                })?;
                *slot = value;
            }
        }
        Ok(())
    }

    /// Every flattened field with its current value, for display.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            ("endpoint".to_string(), self.endpoint().to_string()),
            ("identifier".to_string(), self.identifier().to_string()),
            ("credential".to_string(), self.credential().to_string()),
        ];
        for name in Self::extra_field_names(self.kind()) {
            if let Some(value) = self.extra_slot(name) {
                entries.push((name.to_string(), value.to_string()));
            }
        }
        if let ProviderSettings::Appwrite(s) = self {
            for (entity, collection) in &s.collections {
                entries.push((format!("{}{}", COLLECTION_PREFIX, entity), collection.clone()));
            }
        }
        entries
    }

    /// Credential with everything but the last four characters hidden.
    pub fn masked_credential(&self) -> String {
        let credential = self.credential();
        let count = credential.chars().count();
        if count == 0 {
            return String::new();
        }
        if count <= 4 {
            return "****".to_string();
        }
        let tail: String = credential.chars().skip(count - 4).collect();
        format!("****{}", tail)
    }

    fn endpoint_mut(&mut self) -> &mut String {
        match self {
            ProviderSettings::Appwrite(s) => &mut s.endpoint,
            ProviderSettings::Supabase(s) => &mut s.url,
            ProviderSettings::NHost(s) => &mut s.endpoint,
            ProviderSettings::MySql(s) => &mut s.host,
        }
    }

    fn identifier_mut(&mut self) -> &mut String {
        match self {
            ProviderSettings::Appwrite(s) => &mut s.project_id,
            ProviderSettings::Supabase(s) => &mut s.project_ref,
            ProviderSettings::NHost(s) => &mut s.subdomain,
            ProviderSettings::MySql(s) => &mut s.database,
        }
    }

    fn credential_mut(&mut self) -> &mut String {
        match self {
            ProviderSettings::Appwrite(s) => &mut s.api_key,
            ProviderSettings::Supabase(s) => &mut s.api_key,
            ProviderSettings::NHost(s) => &mut s.admin_secret,
            ProviderSettings::MySql(s) => &mut s.password,
        }
    }

    fn extra_slot(&self, name: &str) -> Option<&str> {
        let value = match (self, name) {
            (ProviderSettings::Appwrite(s), "database_id") => &s.database_id,
            (ProviderSettings::Appwrite(s), "bucket_id") => &s.bucket_id,
            (ProviderSettings::Appwrite(s), other) => {
                let entity = other.strip_prefix(COLLECTION_PREFIX)?;
                return s.collections.get(entity).map(String::as_str);
            }
            (ProviderSettings::Supabase(s), "schema") => &s.schema,
            (ProviderSettings::Supabase(s), "bucket_id") => &s.bucket_id,
            (ProviderSettings::NHost(s), "region") => &s.region,
            (ProviderSettings::NHost(s), "graphql_path") => &s.graphql_path,
            (ProviderSettings::MySql(s), "username") => &s.username,
            (ProviderSettings::MySql(s), "port") => &s.port,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn extra_slot_mut(&mut self, name: &str) -> Option<&mut String> {
        match (self, name) {
            (ProviderSettings::Appwrite(s), "database_id") => Some(&mut s.database_id),
            (ProviderSettings::Appwrite(s), "bucket_id") => Some(&mut s.bucket_id),
            (ProviderSettings::Supabase(s), "schema") => Some(&mut s.schema),
            (ProviderSettings::Supabase(s), "bucket_id") => Some(&mut s.bucket_id),
            (ProviderSettings::NHost(s), "region") => Some(&mut s.region),
            (ProviderSettings::NHost(s), "graphql_path") => Some(&mut s.graphql_path),
            (ProviderSettings::MySql(s), "username") => Some(&mut s.username),
            (ProviderSettings::MySql(s), "port") => Some(&mut s.port),
            _ => None,
        }
    }
}
