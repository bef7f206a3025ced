//! Appwrite databases API client.

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::provider::clients::http::{insert_header, require_endpoint, HttpTransport};
use crate::provider::clients::{ProviderCallError, ProviderClient};
use crate::provider::fields::{self, FieldMap};
use crate::provider::settings::AppwriteSettings;
use crate::provider::{EntityKind, ProviderKind, Record};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::{json, Value};

const KIND: ProviderKind = ProviderKind::Appwrite;

pub struct AppwriteClient {
    http: HttpTransport,
    endpoint: String,
    settings: AppwriteSettings,
    fields: &'static FieldMap,
}

impl AppwriteClient {
    pub fn new(settings: &AppwriteSettings, config: &ClientConfig) -> Result<Self, ApiError> {
        let endpoint = require_endpoint(KIND, &settings.endpoint)?;
        if settings.project_id.trim().is_empty() {
            return Err(ApiError::Validation(
                "Appwrite project id is not configured".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        insert_header(&mut headers, "x-appwrite-project", &settings.project_id, false)?;
        if !settings.api_key.trim().is_empty() {
            insert_header(&mut headers, "x-appwrite-key", &settings.api_key, true)?;
        }

        Ok(Self {
            http: HttpTransport::new(KIND, headers, config.timeout())?,
            endpoint,
            settings: settings.clone(),
            fields: fields::for_kind(KIND),
        })
    }

    fn collection_id<'a>(&'a self, entity: &'a EntityKind) -> &'a str {
        self.settings
            .collections
            .get(&entity.name)
            .map(String::as_str)
            .unwrap_or(&entity.name)
    }

    fn database_url(&self) -> String {
        format!("{}/databases/{}", self.endpoint, self.settings.database_id)
    }

    fn documents_url(&self, entity: &EntityKind) -> String {
        format!(
            "{}/collections/{}/documents",
            self.database_url(),
            self.collection_id(entity)
        )
    }

    fn require_database(&self, operation: &'static str) -> Result<(), ProviderCallError> {
        if self.settings.database_id.trim().is_empty() {
            return Err(ProviderCallError::new(
                KIND,
                operation,
                "database id is not configured",
            ));
        }
        Ok(())
    }

    fn single_document(
        &self,
        operation: &'static str,
        body: Option<Value>,
    ) -> Result<Record, ProviderCallError> {
        body.map(|value| self.fields.to_record(value))
            .ok_or_else(|| ProviderCallError::new(KIND, operation, "empty response body"))
    }
}

#[async_trait]
impl ProviderClient for AppwriteClient {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn initialize(&self) -> Result<(), ProviderCallError> {
        self.require_database("initialize")?;
        let request = self.http.request(Method::GET, &self.database_url());
        self.http.send("initialize", request).await?;
        Ok(())
    }

    async fn fetch_all(&self, entity: &EntityKind) -> Result<Vec<Record>, ProviderCallError> {
        self.require_database("get_all")?;
        let request = self.http.request(Method::GET, &self.documents_url(entity));
        let body = self.http.send("get_all", request).await?;

        let documents = match body {
            Some(Value::Object(mut object)) => match object.remove("documents") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ProviderCallError::new(
                        KIND,
                        "get_all",
                        "response has no documents array",
                    ))
                }
            },
            _ => Vec::new(),
        };

        Ok(documents
            .into_iter()
            .map(|doc| self.fields.to_record(doc))
            .collect())
    }

    async fn create(&self, entity: &EntityKind, record: &Record) -> Result<Record, ProviderCallError> {
        self.require_database("create")?;
        let document_id = record.id.clone().unwrap_or_else(|| "unique()".to_string());
        let payload = json!({
            "documentId": document_id,
            "data": self.fields.to_native(record),
        });
        let request = self
            .http
            .request(Method::POST, &self.documents_url(entity))
            .json(&payload);
        let body = self.http.send("create", request).await?;
        self.single_document("create", body)
    }

    async fn update(&self, entity: &EntityKind, record: &Record) -> Result<Record, ProviderCallError> {
        self.require_database("update")?;
        let id = record
            .require_id()
            .map_err(|m| ProviderCallError::new(KIND, "update", m))?;
        let url = format!("{}/{}", self.documents_url(entity), id);
        let payload = json!({ "data": self.fields.to_native(record) });
        let request = self.http.request(Method::PATCH, &url).json(&payload);
        let body = self.http.send("update", request).await?;
        self.single_document("update", body)
    }

    async fn delete(&self, entity: &EntityKind, record: &Record) -> Result<bool, ProviderCallError> {
        self.require_database("delete")?;
        let id = record
            .require_id()
            .map_err(|m| ProviderCallError::new(KIND, "delete", m))?;
        let url = format!("{}/{}", self.documents_url(entity), id);
        let request = self.http.request(Method::DELETE, &url);
        self.http.send("delete", request).await?;
        Ok(true)
    }
}
