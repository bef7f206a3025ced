//! Switchyard: multi-provider backend settings
//!
//! Keeps one active set of connection settings per backend provider
//! (Appwrite, Supabase, NHost, MySql), persists it as JSON, hands out data
//! clients for the selected provider behind a uniform CRUD facade, and
//! stores named profiles that can be applied, exported and imported.

pub mod active;
pub mod concurrency;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod profiles;
pub mod provider;
pub mod tooling;

pub use active::{ActiveConfiguration, ChangeReason, ConfigurationChange, Subscription};
pub use context::AppContext;
pub use error::ApiError;
pub use profiles::{ImportReport, Profile, ProfileId, ProfileName, ProfileStore};
pub use provider::{
    CrudFacade, CrudResult, EntityKind, ProviderClient, ProviderClientFactory, ProviderKind,
    ProviderSettings, Record, SettingsField,
};
