//! Profiles
//!
//! Named, persisted snapshots of one provider kind's settings. Loading a
//! profile applies it to the active configuration and hot-reloads every
//! subscriber.

mod model;
mod name;
pub mod storage;
mod store;
pub mod transfer;

pub use model::{Profile, ProfileId};
pub use name::{ProfileName, ProfileNameError, MAX_NAME_CHARS, RESERVED_CHARS};
pub use storage::{JsonProfileStorage, MemoryProfileStorage, ProfileStorage};
pub use store::{ProfileStore, PROFILE_CAPACITY};
pub use transfer::ImportReport;
