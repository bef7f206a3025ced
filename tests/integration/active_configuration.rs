use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use switchyard::active::{MemorySettingsStorage, SettingsStorage};
use switchyard::{ActiveConfiguration, ChangeReason, ProviderKind, SettingsField};
use tempfile::TempDir;

use crate::support::open_dir;

#[test]
fn supabase_selection_is_written_as_named_json() {
    let temp_dir = TempDir::new().unwrap();
    let (active, _store) = open_dir(temp_dir.path());

    active.set_selected(ProviderKind::Supabase);
    active
        .set_flat(&SettingsField::Endpoint, "https://x.supabase.co")
        .unwrap();
    active.save().unwrap();

    let raw = fs::read_to_string(temp_dir.path().join("settings.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["selected"], "Supabase");
    assert_eq!(parsed["providers"]["Supabase"]["url"], "https://x.supabase.co");
    assert_eq!(
        parsed["providers"]["Appwrite"]["endpoint"],
        "https://cloud.appwrite.io/v1"
    );
}

#[test]
fn saved_settings_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    {
        let (active, _store) = open_dir(temp_dir.path());
        active.set_selected(ProviderKind::NHost);
        active.set_flat(&SettingsField::Identifier, "myapp").unwrap();
        active.set_flat(&SettingsField::Credential, "hasura-secret").unwrap();
        active.save().unwrap();
    }

    let (restarted, _store) = open_dir(temp_dir.path());
    assert_eq!(restarted.selected(), ProviderKind::NHost);
    assert_eq!(restarted.identifier(), "myapp");
    assert_eq!(restarted.credential(), "hasura-secret");
}

#[test]
fn unsaved_edits_are_dropped_by_reload() {
    let temp_dir = TempDir::new().unwrap();
    let (active, _store) = open_dir(temp_dir.path());
    active.save().unwrap();

    active.set_flat(&SettingsField::Identifier, "draft").unwrap();
    assert_eq!(active.identifier(), "draft");

    active.reload();
    assert_eq!(active.identifier(), "");
}

#[test]
fn corrupt_settings_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("settings.json"), "{ not json").unwrap();

    let (active, _store) = open_dir(temp_dir.path());
    assert_eq!(active.selected(), ProviderKind::Appwrite);
    assert_eq!(active.endpoint(), "https://cloud.appwrite.io/v1");
}

#[test]
fn save_notifies_every_subscriber_once() {
    let active = ActiveConfiguration::load(Arc::new(MemorySettingsStorage::new()));
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(Mutex::new(Vec::new()));

    let counter = first.clone();
    let _a = active.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let seen = second.clone();
    let _b = active.subscribe(move |change| {
        seen.lock().unwrap().push((change.reason, change.selected));
    });

    active.set_selected(ProviderKind::Supabase);
    active.save().unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(
        *second.lock().unwrap(),
        vec![(ChangeReason::Saved, ProviderKind::Supabase)]
    );
}

#[test]
fn failed_save_does_not_notify() {
    let storage = Arc::new(MemorySettingsStorage::failing());
    let active = ActiveConfiguration::load(storage.clone());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let _subscription = active.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(active.save().is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(storage.read().unwrap().is_none());
}

fn kind_strategy() -> impl Strategy<Value = ProviderKind> {
    prop::sample::select(ProviderKind::ALL.to_vec())
}

fn field_strategy() -> impl Strategy<Value = SettingsField> {
    prop_oneof![
        Just(SettingsField::Endpoint),
        Just(SettingsField::Identifier),
        Just(SettingsField::Credential),
    ]
}

proptest! {
    #[test]
    fn flat_edits_only_touch_the_selected_kind(
        kind in kind_strategy(),
        field in field_strategy(),
        value in "[a-zA-Z0-9:/._-]{0,40}",
    ) {
        let active = ActiveConfiguration::load(Arc::new(MemorySettingsStorage::new()));
        active.set_selected(kind);
        let before = active.snapshot();

        active.set_flat(&field, value.clone()).unwrap();

        prop_assert_eq!(active.get_flat(&field), Some(value));
        for other in ProviderKind::ALL.into_iter().filter(|k| *k != kind) {
            prop_assert_eq!(active.settings_for(other), before.settings_for(other));
        }
    }
}
