//! Active Configuration
//!
//! The process-wide record of which provider is selected and every provider's
//! independently stored settings, its persistence and its change broadcast.

mod configuration;
pub mod notify;
pub mod storage;

pub use configuration::{ActiveConfiguration, ConfigurationSnapshot};
pub use notify::{spawn_on_change, ChangeNotifier, ChangeReason, ConfigurationChange, Subscription};
pub use storage::{JsonSettingsStorage, MemorySettingsStorage, PersistedConfiguration, SettingsStorage};
