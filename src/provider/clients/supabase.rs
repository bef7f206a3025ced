//! Supabase client speaking PostgREST.

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::provider::clients::http::{insert_header, require_endpoint, HttpTransport};
use crate::provider::clients::{ProviderCallError, ProviderClient};
use crate::provider::fields::{self, FieldMap, ID};
use crate::provider::settings::SupabaseSettings;
use crate::provider::{EntityKind, ProviderKind, Record};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;

const KIND: ProviderKind = ProviderKind::Supabase;
const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

pub struct SupabaseClient {
    http: HttpTransport,
    rest_url: String,
    fields: &'static FieldMap,
}

impl SupabaseClient {
    pub fn new(settings: &SupabaseSettings, config: &ClientConfig) -> Result<Self, ApiError> {
        let endpoint = require_endpoint(KIND, &settings.url)?;

        let mut headers = HeaderMap::new();
        if !settings.api_key.trim().is_empty() {
            insert_header(&mut headers, "apikey", &settings.api_key, true)?;
            insert_header(
                &mut headers,
                "authorization",
                &format!("Bearer {}", settings.api_key.trim()),
                true,
            )?;
        }
        let schema = settings.schema.trim();
        if !schema.is_empty() && schema != "public" {
            insert_header(&mut headers, "accept-profile", schema, false)?;
            insert_header(&mut headers, "content-profile", schema, false)?;
        }

        Ok(Self {
            http: HttpTransport::new(KIND, headers, config.timeout())?,
            rest_url: format!("{}/rest/v1", endpoint),
            fields: fields::for_kind(KIND),
        })
    }

    fn table_url(&self, entity: &EntityKind) -> String {
        format!("{}/{}", self.rest_url, entity.name)
    }

    fn rows(&self, body: Option<Value>) -> Vec<Record> {
        match body {
            Some(Value::Array(rows)) => rows.into_iter().map(|row| self.fields.to_record(row)).collect(),
            Some(other @ Value::Object(_)) => vec![self.fields.to_record(other)],
            _ => Vec::new(),
        }
    }

    fn first_row(
        &self,
        operation: &'static str,
        body: Option<Value>,
    ) -> Result<Record, ProviderCallError> {
        self.rows(body)
            .into_iter()
            .next()
            .ok_or_else(|| ProviderCallError::new(KIND, operation, "no row returned"))
    }
}

#[async_trait]
impl ProviderClient for SupabaseClient {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn initialize(&self) -> Result<(), ProviderCallError> {
        let request = self.http.request(Method::GET, &format!("{}/", self.rest_url));
        self.http.send("initialize", request).await?;
        Ok(())
    }

    async fn fetch_all(&self, entity: &EntityKind) -> Result<Vec<Record>, ProviderCallError> {
        let request = self
            .http
            .request(Method::GET, &self.table_url(entity))
            .query(&[("select", "*")]);
        let body = self.http.send("get_all", request).await?;
        Ok(self.rows(body))
    }

    async fn create(&self, entity: &EntityKind, record: &Record) -> Result<Record, ProviderCallError> {
        let mut payload = self.fields.to_native(record);
        if let Some(id) = &record.id {
            payload.insert(self.fields.native_name(ID).to_string(), Value::String(id.clone()));
        }
        let request = self
            .http
            .request(Method::POST, &self.table_url(entity))
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&payload);
        let body = self.http.send("create", request).await?;
        self.first_row("create", body)
    }

    async fn update(&self, entity: &EntityKind, record: &Record) -> Result<Record, ProviderCallError> {
        let id = record
            .require_id()
            .map_err(|m| ProviderCallError::new(KIND, "update", m))?;
        let request = self
            .http
            .request(Method::PATCH, &self.table_url(entity))
            .query(&[(self.fields.native_name(ID), format!("eq.{}", id))])
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
            .json(&self.fields.to_native(record));
        let body = self.http.send("update", request).await?;
        self.first_row("update", body)
    }

    async fn delete(&self, entity: &EntityKind, record: &Record) -> Result<bool, ProviderCallError> {
        let id = record
            .require_id()
            .map_err(|m| ProviderCallError::new(KIND, "delete", m))?;
        let request = self
            .http
            .request(Method::DELETE, &self.table_url(entity))
            .query(&[(self.fields.native_name(ID), format!("eq.{}", id))])
            .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1);
        let body = self.http.send("delete", request).await?;
        // PostgREST answers an empty array when the filter matched nothing.
        Ok(match body {
            Some(Value::Array(rows)) => !rows.is_empty(),
            _ => true,
        })
    }
}
