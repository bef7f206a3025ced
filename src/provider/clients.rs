//! Provider client contract and the built-in clients.

pub mod appwrite;
pub mod http;
pub mod nhost;
pub mod supabase;

use crate::provider::{EntityKind, ProviderKind, Record};
use async_trait::async_trait;
use std::fmt;

pub use appwrite::AppwriteClient;
pub use nhost::NHostClient;
pub use supabase::SupabaseClient;

/// A failed provider call, already translated out of the provider's native
/// error shape (HTTP status and body, GraphQL error list, transport error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCallError {
    pub kind: ProviderKind,
    pub operation: &'static str,
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderCallError {
    pub fn new(kind: ProviderKind, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for ProviderCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(
                f,
                "{} {} failed (HTTP {}): {}",
                self.kind, self.operation, status, self.message
            ),
            None => write!(f, "{} {} failed: {}", self.kind, self.operation, self.message),
        }
    }
}

impl std::error::Error for ProviderCallError {}

/// Data-access client for one provider.
///
/// Implementations must not touch the network while being constructed;
/// `initialize` performs the first round trip.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// First network round trip. Safe to call again after a failure.
    async fn initialize(&self) -> Result<(), ProviderCallError>;

    async fn fetch_all(&self, entity: &EntityKind) -> Result<Vec<Record>, ProviderCallError>;

    async fn create(&self, entity: &EntityKind, record: &Record)
        -> Result<Record, ProviderCallError>;

    async fn update(&self, entity: &EntityKind, record: &Record)
        -> Result<Record, ProviderCallError>;

    async fn delete(&self, entity: &EntityKind, record: &Record) -> Result<bool, ProviderCallError>;

    async fn test_connection(&self) -> bool {
        match self.initialize().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(provider = %self.kind(), "Connection test failed: {}", e);
                false
            }
        }
    }
}
