use std::fs;

use switchyard::tooling::cli::{
    CliContext, Commands, ConnectionCommands, ProfileCommands, ProviderCommands,
};
use switchyard::{ApiError, ProviderKind};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::app_in;

fn cli_in(temp_dir: &TempDir) -> CliContext {
    CliContext::with_app(app_in(temp_dir.path())).unwrap()
}

fn provider(command: ProviderCommands) -> Commands {
    Commands::Provider { command }
}

fn profile(command: ProfileCommands) -> Commands {
    Commands::Profile { command }
}

fn connection_test_profile(key: &str) -> Commands {
    Commands::Connection {
        command: ConnectionCommands::Test {
            kind: None,
            profile: Some(key.to_string()),
            all: false,
        },
    }
}

#[test]
fn provider_list_json_contract_has_required_fields() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli_in(&temp_dir);
    cli.execute(&provider(ProviderCommands::Select {
        kind: "supabase".to_string(),
    }))
    .unwrap();

    let output = cli
        .execute(&provider(ProviderCommands::List {
            format: "json".to_string(),
        }))
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["selected"], "Supabase");
    let providers = parsed["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 4);
    let mysql = providers.iter().find(|p| p["kind"] == "MySql").unwrap();
    assert_eq!(mysql["client_available"], false);
    assert_eq!(mysql["selected"], false);
}

#[test]
fn provider_select_rejects_unknown_kind() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli_in(&temp_dir);

    let err = cli
        .execute(&provider(ProviderCommands::Select {
            kind: "firebase".to_string(),
        }))
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(!temp_dir.path().join("settings.json").exists());
}

#[test]
fn provider_show_json_masks_credential() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli_in(&temp_dir);
    cli.execute(&provider(ProviderCommands::Set {
        field: "credential".to_string(),
        value: "appwrite-api-key-abcd".to_string(),
        kind: None,
    }))
    .unwrap();

    let output = cli
        .execute(&provider(ProviderCommands::Show {
            kind: None,
            format: "json".to_string(),
            show_secrets: false,
        }))
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["provider"], "Appwrite");
    assert_eq!(parsed["fields"]["credential"], "****abcd");
}

#[test]
fn profile_create_load_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli_in(&temp_dir);

    cli.execute(&provider(ProviderCommands::Select {
        kind: "nhost".to_string(),
    }))
    .unwrap();
    cli.execute(&profile(ProfileCommands::Create {
        name: "Staging".to_string(),
        description: "shared staging".to_string(),
    }))
    .unwrap();
    cli.execute(&provider(ProviderCommands::Select {
        kind: "appwrite".to_string(),
    }))
    .unwrap();

    let output = cli
        .execute(&profile(ProfileCommands::Load {
            profile: "staging".to_string(),
        }))
        .unwrap();
    assert!(output.contains("NHost"));
    assert_eq!(
        cli.app().active_configuration().selected(),
        ProviderKind::NHost
    );

    cli.execute(&profile(ProfileCommands::Delete {
        profile: "Staging".to_string(),
        yes: true,
    }))
    .unwrap();
    let listed = cli
        .execute(&profile(ProfileCommands::List {
            format: "json".to_string(),
        }))
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&listed).unwrap();
    assert!(parsed.as_array().unwrap().is_empty());
}

#[test]
fn profile_export_file_imports_elsewhere() {
    let source_dir = TempDir::new().unwrap();
    let source = cli_in(&source_dir);
    source
        .execute(&profile(ProfileCommands::Create {
            name: "Dev".to_string(),
            description: String::new(),
        }))
        .unwrap();
    let export_path = source_dir.path().join("backup.json");
    source
        .execute(&profile(ProfileCommands::Export {
            profiles: vec![],
            output: Some(export_path.clone()),
        }))
        .unwrap();
    assert!(fs::read_to_string(&export_path).unwrap().contains("\"Dev\""));

    let target_dir = TempDir::new().unwrap();
    let target = cli_in(&target_dir);
    let output = target
        .execute(&profile(ProfileCommands::Import { file: export_path }))
        .unwrap();

    assert!(output.contains("Imported 1 profile(s)"));
    assert!(output.contains("Dev"));
    assert_eq!(target.app().profile_store().unwrap().count(), 1);
}

#[test]
fn profile_show_unknown_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli_in(&temp_dir);

    let err = cli
        .execute(&profile(ProfileCommands::Show {
            profile: "missing".to_string(),
            format: "text".to_string(),
            show_secrets: false,
        }))
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn connection_test_uses_profile_settings_without_loading_it() {
    // The CLI owns a current-thread runtime, so the mock server lives on its own.
    let server_runtime = tokio::runtime::Runtime::new().unwrap();
    let server = server_runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let temp_dir = TempDir::new().unwrap();
    let cli = cli_in(&temp_dir);
    cli.execute(&provider(ProviderCommands::Select {
        kind: "supabase".to_string(),
    }))
    .unwrap();
    cli.execute(&provider(ProviderCommands::Set {
        field: "endpoint".to_string(),
        value: server.uri(),
        kind: None,
    }))
    .unwrap();
    cli.execute(&profile(ProfileCommands::Create {
        name: "Local Supabase".to_string(),
        description: String::new(),
    }))
    .unwrap();
    cli.execute(&provider(ProviderCommands::Select {
        kind: "appwrite".to_string(),
    }))
    .unwrap();

    let output = cli.execute(&connection_test_profile("local supabase")).unwrap();

    assert!(output.contains("Supabase connection OK"), "{}", output);
    assert_eq!(
        cli.app().active_configuration().selected(),
        ProviderKind::Appwrite
    );
    server_runtime.block_on(server.verify());
}

#[test]
fn connection_test_unknown_profile_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli_in(&temp_dir);

    let err = cli.execute(&connection_test_profile("missing")).unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
}
