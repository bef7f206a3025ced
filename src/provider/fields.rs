//! Compile-time field mapping between normalized records and provider payloads.

use crate::provider::{ProviderKind, Record};
use serde_json::{Map, Value};

/// Normalized name to provider-native name, plus the prefix of native system
/// fields that never reach a normalized record.
#[derive(Debug)]
pub struct FieldMap {
    pub pairs: &'static [(&'static str, &'static str)],
    pub system_prefix: Option<&'static str>,
}

pub const ID: &str = "id";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

static APPWRITE: FieldMap = FieldMap {
    pairs: &[(ID, "$id"), (CREATED_AT, "$createdAt"), (UPDATED_AT, "$updatedAt")],
    system_prefix: Some("$"),
};

static SQL_LIKE: FieldMap = FieldMap {
    pairs: &[(ID, "id"), (CREATED_AT, "created_at"), (UPDATED_AT, "updated_at")],
    system_prefix: None,
};

static GRAPHQL: FieldMap = FieldMap {
    pairs: &[(ID, "id"), (CREATED_AT, "created_at"), (UPDATED_AT, "updated_at")],
    system_prefix: Some("__"),
};

pub fn for_kind(kind: ProviderKind) -> &'static FieldMap {
    match kind {
        ProviderKind::Appwrite => &APPWRITE,
        ProviderKind::Supabase | ProviderKind::MySql => &SQL_LIKE,
        ProviderKind::NHost => &GRAPHQL,
    }
}

impl FieldMap {
    pub fn native_name<'a>(&self, normalized: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, native)| *native)
            .unwrap_or(normalized)
    }

    pub fn normalized_name<'a>(&self, native: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(_, n)| *n == native)
            .map(|(normalized, _)| *normalized)
            .unwrap_or(native)
    }

    fn is_system_field(&self, native: &str) -> bool {
        let mapped = self.pairs.iter().any(|(_, n)| *n == native);
        !mapped
            && self
                .system_prefix
                .map(|prefix| native.starts_with(prefix))
                .unwrap_or(false)
    }

    /// Translate a provider object into a normalized record.
    ///
    /// Non-object payloads produce an empty record.
    pub fn to_record(&self, native: Value) -> Record {
        let Value::Object(object) = native else {
            return Record::default();
        };

        let mut record = Record::default();
        for (key, value) in object {
            if self.is_system_field(&key) {
                continue;
            }
            let name = self.normalized_name(&key);
            if name == ID {
                record.id = match value {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                };
                continue;
            }
            record.fields.insert(name.to_string(), value);
        }
        record
    }

    /// Native payload for writes. The id and provider-managed timestamps are
    /// left out; clients address records by id through the URL or arguments.
    pub fn to_native(&self, record: &Record) -> Map<String, Value> {
        record
            .fields
            .iter()
            .filter(|(name, _)| !matches!(name.as_str(), ID | CREATED_AT | UPDATED_AT))
            .map(|(name, value)| (self.native_name(name).to_string(), value.clone()))
            .collect()
    }
}
