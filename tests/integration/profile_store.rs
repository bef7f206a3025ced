use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use switchyard::profiles::PROFILE_CAPACITY;
use switchyard::{ApiError, ChangeReason, ProviderKind, SettingsField};
use tempfile::TempDir;

use crate::support::open_dir;

#[test]
fn names_are_unique_ignoring_case() {
    let temp_dir = TempDir::new().unwrap();
    let (_active, store) = open_dir(temp_dir.path());

    store.create_from_active("Staging", "").unwrap();
    let err = store.create_from_active("  staging ", "").unwrap_err();

    assert!(matches!(err, ApiError::DuplicateName(_)));
    assert_eq!(store.count(), 1);
}

#[test]
fn store_refuses_profile_past_capacity() {
    let temp_dir = TempDir::new().unwrap();
    let (_active, store) = open_dir(temp_dir.path());

    for i in 0..PROFILE_CAPACITY {
        store.create_from_active(&format!("profile-{}", i), "").unwrap();
    }
    assert!(!store.can_add_more());

    let err = store.create_from_active("one-too-many", "").unwrap_err();
    assert!(matches!(err, ApiError::CapacityExceeded { capacity: 100 }));
    assert_eq!(store.count(), PROFILE_CAPACITY);
}

#[test]
fn profiles_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let (active, store) = open_dir(temp_dir.path());
        active.set_selected(ProviderKind::Supabase);
        active
            .set_flat(&SettingsField::Endpoint, "https://prod.supabase.co")
            .unwrap();
        store
            .create_from_active("Production", "live project")
            .unwrap()
            .id
    };

    let (_active, store) = open_dir(temp_dir.path());
    let profile = store.get(&id).unwrap();
    assert_eq!(profile.name, "Production");
    assert_eq!(profile.description, "live project");
    assert_eq!(profile.connection.endpoint(), "https://prod.supabase.co");
}

#[test]
fn loading_a_profile_persists_and_notifies_once() {
    let temp_dir = TempDir::new().unwrap();
    let (active, store) = open_dir(temp_dir.path());

    active.set_selected(ProviderKind::NHost);
    active.set_flat(&SettingsField::Identifier, "staging-app").unwrap();
    let profile = store.create_from_active("Staging", "").unwrap();

    active.set_selected(ProviderKind::Appwrite);
    active.save().unwrap();

    let applied = Arc::new(AtomicUsize::new(0));
    let counter = applied.clone();
    let _subscription = active.subscribe(move |change| {
        assert_eq!(change.reason, ChangeReason::ProfileApplied);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.load(&profile.id).unwrap();

    assert_eq!(applied.load(Ordering::SeqCst), 1);
    assert_eq!(active.selected(), ProviderKind::NHost);
    assert_eq!(active.identifier(), "staging-app");

    let (restarted, _store) = open_dir(temp_dir.path());
    assert_eq!(restarted.selected(), ProviderKind::NHost);
    assert_eq!(restarted.identifier(), "staging-app");
}

#[test]
fn export_then_import_into_empty_store() {
    let source_dir = TempDir::new().unwrap();
    let (active, source) = open_dir(source_dir.path());
    active.set_flat(&SettingsField::Credential, "appwrite-key").unwrap();
    source.create_from_active("Dev", "local").unwrap();
    active.set_selected(ProviderKind::MySql);
    source.create_from_active("Reporting", "").unwrap();

    let payload = source.export(None).unwrap();

    let target_dir = TempDir::new().unwrap();
    let (_active, target) = open_dir(target_dir.path());
    let report = target.import(&payload).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.imported_count(), 2);
    assert_eq!(target.list(), source.list());
    let names: Vec<String> = target.list().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Dev".to_string(), "Reporting".to_string()]);
    let dev = target.find_by_name("dev").unwrap();
    assert_eq!(dev.connection.credential(), "appwrite-key");
    assert_eq!(target.find_by_name("Reporting").unwrap().kind(), ProviderKind::MySql);
}

#[test]
fn import_skips_duplicates_and_reports_them() {
    let temp_dir = TempDir::new().unwrap();
    let (_active, store) = open_dir(temp_dir.path());
    store.create_from_active("Staging", "").unwrap();

    let payload = store.export(None).unwrap();
    let report = store.import(&payload).unwrap();

    assert_eq!(report.imported_count(), 0);
    assert_eq!(report.skipped_count(), 1);
    assert!(report.error_message().unwrap().contains("Staging"));
    assert_eq!(store.count(), 1);
}

#[test]
fn malformed_import_changes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let (_active, store) = open_dir(temp_dir.path());
    store.create_from_active("Staging", "").unwrap();
    let before = fs::read_to_string(temp_dir.path().join("profiles.json")).unwrap();

    let err = store.import(r#"{"name": "not a list"}"#).unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    let after = fs::read_to_string(temp_dir.path().join("profiles.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn corrupt_profile_file_is_not_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profiles.json");
    fs::write(&path, "[{ truncated").unwrap();

    let app = crate::support::app_in(temp_dir.path());
    assert!(matches!(app.profile_store(), Err(ApiError::Persistence(_))));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{ truncated");
}

#[test]
fn over_capacity_profile_file_is_left_intact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profiles.json");
    let entries: Vec<serde_json::Value> = (0..PROFILE_CAPACITY + 5)
        .map(|i| {
            serde_json::json!({
                "id": format!("id-{}", i),
                "name": format!("profile-{}", i),
                "connection": {"kind": "Supabase", "settings": {}}
            })
        })
        .collect();
    let content = serde_json::to_string_pretty(&entries).unwrap();
    fs::write(&path, &content).unwrap();

    let app = crate::support::app_in(temp_dir.path());
    assert!(matches!(app.profile_store(), Err(ApiError::Persistence(_))));
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
}
