//! Provider Domain
//!
//! Provider kinds, their independently stored settings, the field mapping
//! tables, the concrete data-access clients and the uniform CRUD facade.

pub mod clients;
pub mod facade;
pub mod factory;
pub mod fields;
mod kind;
mod record;
pub mod settings;

pub use clients::{ProviderCallError, ProviderClient};
pub use facade::{CrudFacade, CrudResult};
pub use factory::{ClientConstructor, ProviderClientFactory};
pub use kind::ProviderKind;
pub use record::{EntityKind, Record};
pub use settings::{ProviderSettings, SettingsField};
