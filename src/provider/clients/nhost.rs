//! NHost client over Hasura GraphQL.

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::provider::clients::http::{insert_header, require_endpoint, HttpTransport};
use crate::provider::clients::{ProviderCallError, ProviderClient};
use crate::provider::fields::{self, FieldMap, ID};
use crate::provider::settings::NHostSettings;
use crate::provider::{EntityKind, ProviderKind, Record};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::{json, Map, Value};

const KIND: ProviderKind = ProviderKind::NHost;

pub struct NHostClient {
    http: HttpTransport,
    graphql_url: String,
    fields: &'static FieldMap,
}

impl NHostClient {
    pub fn new(settings: &NHostSettings, config: &ClientConfig) -> Result<Self, ApiError> {
        let graphql_url = require_endpoint(KIND, &settings.graphql_url())?;

        let mut headers = HeaderMap::new();
        if !settings.admin_secret.trim().is_empty() {
            insert_header(&mut headers, "x-hasura-admin-secret", &settings.admin_secret, true)?;
        }

        Ok(Self {
            http: HttpTransport::new(KIND, headers, config.timeout())?,
            graphql_url,
            fields: fields::for_kind(KIND),
        })
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Run one GraphQL document and return the `data` object.
    async fn execute(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
    ) -> Result<Map<String, Value>, ProviderCallError> {
        let request = self
            .http
            .request(Method::POST, &self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }));
        let body = self.http.send(operation, request).await?;
        let Some(Value::Object(mut response)) = body else {
            return Err(ProviderCallError::new(KIND, operation, "empty GraphQL response"));
        };

        if let Some(message) = graphql_errors(&response) {
            return Err(ProviderCallError::new(KIND, operation, message));
        }

        match response.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            _ => Err(ProviderCallError::new(
                KIND,
                operation,
                "GraphQL response has no data",
            )),
        }
    }

    fn selection(&self, operation: &'static str, entity: &EntityKind) -> Result<String, ProviderCallError> {
        let mut names = vec![self.fields.native_name(ID)];
        for field in &entity.fields {
            let native = self.fields.native_name(field);
            if !names.contains(&native) {
                names.push(native);
            }
        }
        for name in &names {
            check_identifier(operation, name)?;
        }
        Ok(names.join(" "))
    }

    fn root_record(
        &self,
        operation: &'static str,
        mut data: Map<String, Value>,
        root: &str,
    ) -> Result<Record, ProviderCallError> {
        match data.remove(root) {
            Some(value @ Value::Object(_)) => Ok(self.fields.to_record(value)),
            _ => Err(ProviderCallError::new(
                KIND,
                operation,
                format!("{} returned no row", root),
            )),
        }
    }
}

#[async_trait]
impl ProviderClient for NHostClient {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn initialize(&self) -> Result<(), ProviderCallError> {
        self.execute("initialize", "query { __typename }", json!({}))
            .await
            .map(|_| ())
    }

    async fn fetch_all(&self, entity: &EntityKind) -> Result<Vec<Record>, ProviderCallError> {
        check_identifier("get_all", &entity.name)?;
        if entity.fields.is_empty() {
            return Err(ProviderCallError::new(
                KIND,
                "get_all",
                format!("GraphQL queries need a field selection for {}", entity.name),
            ));
        }
        let query = format!(
            "query {{ {} {{ {} }} }}",
            entity.name,
            self.selection("get_all", entity)?
        );
        let mut data = self.execute("get_all", &query, json!({})).await?;
        match data.remove(&entity.name) {
            Some(Value::Array(rows)) => Ok(rows.into_iter().map(|row| self.fields.to_record(row)).collect()),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(_) => Err(ProviderCallError::new(
                KIND,
                "get_all",
                format!("{} did not return a list", entity.name),
            )),
        }
    }

    async fn create(&self, entity: &EntityKind, record: &Record) -> Result<Record, ProviderCallError> {
        check_identifier("create", &entity.name)?;
        let root = format!("insert_{}_one", entity.name);
        let query = format!(
            "mutation ($object: {}_insert_input!) {{ {}(object: $object) {{ {} }} }}",
            entity.name,
            root,
            self.selection("create", entity)?
        );
        let mut object = self.fields.to_native(record);
        if let Some(id) = &record.id {
            object.insert(self.fields.native_name(ID).to_string(), Value::String(id.clone()));
        }
        let data = self
            .execute("create", &query, json!({ "object": object }))
            .await?;
        self.root_record("create", data, &root)
    }

    async fn update(&self, entity: &EntityKind, record: &Record) -> Result<Record, ProviderCallError> {
        check_identifier("update", &entity.name)?;
        let id = record
            .require_id()
            .map_err(|m| ProviderCallError::new(KIND, "update", m))?;
        let root = format!("update_{}_by_pk", entity.name);
        let query = format!(
            "mutation ($set: {}_set_input!) {{ {}(pk_columns: {{{}: {}}}, _set: $set) {{ {} }} }}",
            entity.name,
            root,
            self.fields.native_name(ID),
            id_literal(id),
            self.selection("update", entity)?
        );
        let data = self
            .execute("update", &query, json!({ "set": self.fields.to_native(record) }))
            .await?;
        self.root_record("update", data, &root)
    }

    async fn delete(&self, entity: &EntityKind, record: &Record) -> Result<bool, ProviderCallError> {
        check_identifier("delete", &entity.name)?;
        let id = record
            .require_id()
            .map_err(|m| ProviderCallError::new(KIND, "delete", m))?;
        let root = format!("delete_{}_by_pk", entity.name);
        let id_field = self.fields.native_name(ID);
        let query = format!(
            "mutation {{ {}({}: {}) {{ {} }} }}",
            root,
            id_field,
            id_literal(id),
            id_field
        );
        let mut data = self.execute("delete", &query, json!({})).await?;
        Ok(matches!(data.remove(&root), Some(Value::Object(_))))
    }
}

/// Join the messages of a GraphQL `errors` array, if any.
pub fn graphql_errors(response: &Map<String, Value>) -> Option<String> {
    let errors = response.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<String> = errors
        .iter()
        .map(|error| {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown GraphQL error");
            match error
                .pointer("/extensions/code")
                .and_then(Value::as_str)
            {
                Some(code) => format!("{} ({})", message, code),
                None => message.to_string(),
            }
        })
        .collect();
    Some(messages.join("; "))
}

/// Inline literal for a primary key: numbers stay numbers, everything else is quoted.
fn id_literal(id: &str) -> String {
    if id.parse::<i64>().is_ok() {
        id.to_string()
    } else {
        Value::String(id.to_string()).to_string()
    }
}

fn check_identifier(operation: &'static str, name: &str) -> Result<(), ProviderCallError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProviderCallError::new(
            KIND,
            operation,
            format!("'{}' is not a valid GraphQL name", name),
        ))
    }
}
