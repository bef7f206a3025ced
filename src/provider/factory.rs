//! Maps provider kinds to client constructors.

use crate::active::ActiveConfiguration;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::provider::clients::{AppwriteClient, NHostClient, ProviderClient, SupabaseClient};
use crate::provider::facade::CrudFacade;
use crate::provider::{ProviderKind, ProviderSettings};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a client from one kind's settings. Must not perform network I/O.
pub type ClientConstructor = Arc<
    dyn Fn(&ProviderSettings, &ClientConfig) -> Result<Box<dyn ProviderClient>, ApiError>
        + Send
        + Sync,
>;

pub struct ProviderClientFactory {
    active: Arc<ActiveConfiguration>,
    client_config: ClientConfig,
    constructors: HashMap<ProviderKind, ClientConstructor>,
}

impl ProviderClientFactory {
    /// Factory with the built-in Appwrite, Supabase and NHost clients.
    pub fn new(active: Arc<ActiveConfiguration>, client_config: ClientConfig) -> Self {
        let mut factory = Self::empty(active, client_config);
        for kind in [ProviderKind::Appwrite, ProviderKind::Supabase, ProviderKind::NHost] {
            factory.register(kind, Arc::new(build_builtin));
        }
        factory
    }

    /// Factory without any registered client.
    pub fn empty(active: Arc<ActiveConfiguration>, client_config: ClientConfig) -> Self {
        Self {
            active,
            client_config,
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) the constructor used for `kind`.
    pub fn register(&mut self, kind: ProviderKind, constructor: ClientConstructor) {
        tracing::debug!(provider = %kind, "Registered provider client constructor");
        self.constructors.insert(kind, constructor);
    }

    pub fn is_supported(&self, kind: ProviderKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    pub fn supported_kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.is_supported(*kind))
            .collect()
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }

    /// Client for `kind`, built from that kind's stored settings.
    pub fn create(&self, kind: ProviderKind) -> Result<Box<dyn ProviderClient>, ApiError> {
        let settings = self.active.settings_for(kind);
        self.create_with_settings(&settings)
    }

    /// Client for the currently selected kind.
    pub fn create_for_active(&self) -> Result<Box<dyn ProviderClient>, ApiError> {
        self.create(self.active.selected())
    }

    /// Client for an arbitrary settings snapshot, e.g. a profile that is not loaded.
    pub fn create_with_settings(
        &self,
        settings: &ProviderSettings,
    ) -> Result<Box<dyn ProviderClient>, ApiError> {
        let kind = settings.kind();
        let constructor = self
            .constructors
            .get(&kind)
            .ok_or(ApiError::UnsupportedProvider(kind))?;
        let client = constructor(settings, &self.client_config)?;
        tracing::debug!(provider = %kind, "Created provider client");
        Ok(client)
    }

    /// CRUD facade for `kind`, or for the selected kind when `None`.
    pub fn create_crud_facade(&self, kind: Option<ProviderKind>) -> Result<CrudFacade, ApiError> {
        let client = match kind {
            Some(kind) => self.create(kind)?,
            None => self.create_for_active()?,
        };
        Ok(CrudFacade::new(client))
    }
}

fn build_builtin(
    settings: &ProviderSettings,
    config: &ClientConfig,
) -> Result<Box<dyn ProviderClient>, ApiError> {
    match settings {
        ProviderSettings::Appwrite(s) => Ok(Box::new(AppwriteClient::new(s, config)?)),
        ProviderSettings::Supabase(s) => Ok(Box::new(SupabaseClient::new(s, config)?)),
        ProviderSettings::NHost(s) => Ok(Box::new(NHostClient::new(s, config)?)),
        ProviderSettings::MySql(_) => Err(ApiError::UnsupportedProvider(ProviderKind::MySql)),
    }
}
