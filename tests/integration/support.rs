use std::path::Path;
use std::sync::Arc;

use switchyard::active::JsonSettingsStorage;
use switchyard::config::{AppConfig, StoragePaths};
use switchyard::profiles::JsonProfileStorage;
use switchyard::{ActiveConfiguration, AppContext, ProfileStore};

/// Settings and profiles backed by files in `dir`.
pub fn open_dir(dir: &Path) -> (Arc<ActiveConfiguration>, ProfileStore) {
    let paths = StoragePaths::in_dir(dir);
    let active = Arc::new(ActiveConfiguration::load(Arc::new(JsonSettingsStorage::new(
        &paths.settings_file,
    ))));
    let store = ProfileStore::open(
        Arc::new(JsonProfileStorage::new(&paths.profiles_file)),
        active.clone(),
    )
    .unwrap();
    (active, store)
}

pub fn app_in(dir: &Path) -> AppContext {
    AppContext::with_paths(AppConfig::default(), StoragePaths::in_dir(dir))
}
