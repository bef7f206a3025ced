//! Uniform CRUD contract over any provider client.

use crate::provider::clients::{ProviderCallError, ProviderClient};
use crate::provider::{EntityKind, ProviderKind, Record};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a facade call: `{success, data, errorMessage}`.
///
/// A successful result never carries a message; a failed one always carries a
/// non-empty message and `T::default()` as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudResult<T> {
    success: bool,
    data: T,
    error_message: Option<String>,
}

impl<T: Default> CrudResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unknown provider error".to_string()
        } else {
            message
        };
        Self {
            success: false,
            data: T::default(),
            error_message: Some(message),
        }
    }

    fn from_call(result: Result<T, ProviderCallError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                tracing::warn!(provider = %e.kind, operation = e.operation, "{}", e);
                Self::failure(e.to_string())
            }
        }
    }
}

impl<T> CrudResult<T> {
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn into_result(self) -> Result<T, String> {
        match self.error_message {
            None => Ok(self.data),
            Some(message) => Err(message),
        }
    }
}

/// The facade pages and background tasks use instead of talking to a provider.
#[derive(Clone)]
pub struct CrudFacade {
    client: Arc<dyn ProviderClient>,
}

impl CrudFacade {
    pub fn new(client: Box<dyn ProviderClient>) -> Self {
        Self {
            client: Arc::from(client),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.client.kind()
    }

    pub async fn get_all(&self, entity: &EntityKind) -> CrudResult<Vec<Record>> {
        CrudResult::from_call(self.client.fetch_all(entity).await)
    }

    pub async fn create(&self, entity: &EntityKind, record: &Record) -> CrudResult<Record> {
        CrudResult::from_call(self.client.create(entity, record).await)
    }

    pub async fn update(&self, entity: &EntityKind, record: &Record) -> CrudResult<Record> {
        CrudResult::from_call(self.client.update(entity, record).await)
    }

    pub async fn delete(&self, entity: &EntityKind, record: &Record) -> CrudResult<bool> {
        CrudResult::from_call(self.client.delete(entity, record).await)
    }

    pub async fn test_connection(&self) -> bool {
        self.client.test_connection().await
    }
}
