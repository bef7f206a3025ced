//! CLI Tooling
//!
//! Command-line interface over the settings core: inspect and edit provider
//! settings, manage profiles, test connections and list records through the
//! CRUD facade.

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::logging::LogFormat;
use crate::profiles::{Profile, ProfileId, ProfileStore};
use crate::provider::{EntityKind, ProviderKind, ProviderSettings, SettingsField};
use crate::tooling::format::{
    format_import_report_text, format_profile_list_text, format_profile_text,
    format_provider_list_text, format_records_text, format_settings_text, settings_json,
    status_mark, to_pretty_json, ProviderRow,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Switchyard CLI - switch backend providers and manage connection profiles
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Manage multi-provider backend settings and named profiles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding settings.json and profiles.json
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.config_dir {
            config.storage.config_dir = Some(dir.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and edit provider settings
    Provider {
        #[command(subcommand)]
        command: ProviderCommands,
    },
    /// Manage named profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Provider connectivity
    Connection {
        #[command(subcommand)]
        command: ConnectionCommands,
    },
    /// Read records through the CRUD facade
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
}

#[derive(Subcommand)]
pub enum ProviderCommands {
    /// List provider kinds with their stored endpoint and identifier
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the settings of one provider (default: the selected one)
    Show {
        /// Provider kind (appwrite, supabase, nhost, mysql)
        #[arg(long)]
        kind: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Print the credential instead of masking it
        #[arg(long)]
        show_secrets: bool,
    },
    /// Select the active provider and save
    Select {
        /// Provider kind (appwrite, supabase, nhost, mysql)
        kind: String,
    },
    /// Set one settings field and save
    Set {
        /// Field: endpoint, identifier, credential or a provider-specific name
        field: String,
        /// New value
        value: String,
        /// Provider to edit (default: the selected one)
        #[arg(long)]
        kind: Option<String>,
    },
    /// Save the current settings
    Save,
    /// Re-read the settings file
    Reload,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List profiles
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Snapshot the selected provider's settings as a new profile
    Create {
        /// Profile name
        name: String,
        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show a profile
    Show {
        /// Profile id or name
        profile: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Print the credential instead of masking it
        #[arg(long)]
        show_secrets: bool,
    },
    /// Apply a profile to the active settings
    Load {
        /// Profile id or name
        profile: String,
    },
    /// Rename a profile
    Rename {
        /// Profile id or name
        profile: String,
        /// New name
        new_name: String,
    },
    /// Delete a profile
    Delete {
        /// Profile id or name
        profile: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Export profiles as JSON (includes credentials)
    Export {
        /// Profile ids or names (default: all)
        profiles: Vec<String>,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Import profiles from a JSON export
    Import {
        /// Export file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConnectionCommands {
    /// Perform the first round trip against a provider
    Test {
        /// Provider kind (default: the selected one)
        #[arg(long)]
        kind: Option<String>,
        /// Test a saved profile's settings without loading it
        #[arg(long, conflicts_with = "kind")]
        profile: Option<String>,
        /// Test every provider that has a client, concurrently
        #[arg(long, conflicts_with_all = ["kind", "profile"])]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// List the records of an entity
    List {
        /// Entity name (collection, table or GraphQL root field)
        entity: String,
        /// Comma-separated fields to select
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        /// Provider kind (default: the selected one)
        #[arg(long)]
        kind: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// CLI context: the application context plus a runtime for provider calls.
pub struct CliContext {
    app: AppContext,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    pub fn from_config(config: AppConfig) -> Result<Self, ApiError> {
        Self::with_app(AppContext::new(config)?)
    }

    pub fn with_app(app: AppContext) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start async runtime: {}", e)))?;
        Ok(Self { app, runtime })
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = match command {
            Commands::Provider { command } => self.handle_provider_command(command),
            Commands::Profile { command } => self.handle_profile_command(command),
            Commands::Connection { command } => self.handle_connection_command(command),
            Commands::Data { command } => self.handle_data_command(command),
        };
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn handle_provider_command(&self, command: &ProviderCommands) -> Result<String, ApiError> {
        match command {
            ProviderCommands::List { format } => self.handle_provider_list(format),
            ProviderCommands::Show {
                kind,
                format,
                show_secrets,
            } => self.handle_provider_show(kind.as_deref(), format, *show_secrets),
            ProviderCommands::Select { kind } => self.handle_provider_select(kind),
            ProviderCommands::Set { field, value, kind } => {
                self.handle_provider_set(field, value, kind.as_deref())
            }
            ProviderCommands::Save => {
                let active = self.app.active_configuration();
                active.save()?;
                Ok(format!(
                    "{} Saved settings to {}",
                    status_mark(true),
                    active.storage_location()
                ))
            }
            ProviderCommands::Reload => {
                let active = self.app.active_configuration();
                active.reload();
                Ok(format!(
                    "{} Reloaded settings, selected provider: {}",
                    status_mark(true),
                    active.selected()
                ))
            }
        }
    }

    fn handle_provider_list(&self, format: &str) -> Result<String, ApiError> {
        let active = self.app.active_configuration();
        let factory = self.app.client_factory();
        let selected = active.selected();
        let rows: Vec<ProviderRow> = ProviderKind::ALL
            .into_iter()
            .map(|kind| {
                let settings = active.settings_for(kind);
                ProviderRow {
                    kind,
                    selected: kind == selected,
                    client_available: factory.is_supported(kind),
                    endpoint: settings.endpoint().to_string(),
                    identifier: settings.identifier().to_string(),
                }
            })
            .collect();
        match format {
            "json" => to_pretty_json(&json!({ "selected": selected, "providers": rows })),
            _ => Ok(format_provider_list_text(&rows)),
        }
    }

    fn handle_provider_show(
        &self,
        kind: Option<&str>,
        format: &str,
        show_secrets: bool,
    ) -> Result<String, ApiError> {
        let active = self.app.active_configuration();
        let kind = resolve_kind(kind, active.selected())?;
        let settings = active.settings_for(kind);
        let selected = kind == active.selected();
        match format {
            "json" => to_pretty_json(&settings_json(&settings, selected, show_secrets)),
            _ => Ok(format_settings_text(&settings, selected, show_secrets)),
        }
    }

    fn handle_provider_select(&self, kind: &str) -> Result<String, ApiError> {
        let kind: ProviderKind = kind.parse()?;
        let active = self.app.active_configuration();
        active.set_selected(kind);
        active.save()?;
        let mut output = format!("{} Selected provider: {}", status_mark(true), kind);
        if !self.app.client_factory().is_supported(kind) {
            output.push_str(&format!(
                "\nNote: no built-in client for {}; data commands will fail until one is registered.",
                kind
            ));
        }
        Ok(output)
    }

    fn handle_provider_set(&self, field: &str, value: &str, kind: Option<&str>) -> Result<String, ApiError> {
        let field: SettingsField = field.parse()?;
        let active = self.app.active_configuration();
        let kind = resolve_kind(kind, active.selected())?;

        if kind == active.selected() {
            active.set_flat(&field, value)?;
        } else {
            let mut settings = active.settings_for(kind);
            settings.set(&field, value)?;
            active.replace_settings(settings);
        }
        active.save()?;

        let shown = if field == SettingsField::Credential {
            active.settings_for(kind).masked_credential()
        } else {
            value.to_string()
        };
        Ok(format!("{} {}.{} = {}", status_mark(true), kind, field, shown))
    }

    fn handle_profile_command(&self, command: &ProfileCommands) -> Result<String, ApiError> {
        let store = self.app.profile_store()?;
        match command {
            ProfileCommands::List { format } => {
                let profiles = store.list();
                match format.as_str() {
                    "json" => to_pretty_json(&profiles),
                    _ => Ok(format_profile_list_text(&profiles, store.capacity())),
                }
            }
            ProfileCommands::Create { name, description } => {
                let profile = store.create_from_active(name, description)?;
                Ok(format!(
                    "{} Created profile '{}' ({}) from {} settings\n{} of {} profiles used",
                    status_mark(true),
                    profile.name,
                    profile.id,
                    profile.kind(),
                    store.count(),
                    store.capacity()
                ))
            }
            ProfileCommands::Show {
                profile,
                format,
                show_secrets,
            } => {
                let profile = resolve_profile(&store, profile)?;
                match format.as_str() {
                    "json" if *show_secrets => to_pretty_json(&profile),
                    "json" => {
                        let mut value = serde_json::to_value(&profile).map_err(|e| {
                            ApiError::ConfigError(format!("Failed to render JSON output: {}", e))
                        })?;
                        value["connection"] = settings_json(&profile.connection, false, false);
                        to_pretty_json(&value)
                    }
                    _ => Ok(format_profile_text(&profile, *show_secrets)),
                }
            }
            ProfileCommands::Load { profile } => {
                let profile = resolve_profile(&store, profile)?;
                let loaded = store.load(&profile.id)?;
                Ok(format!(
                    "{} Loaded profile '{}': {} is now the selected provider",
                    status_mark(true),
                    loaded.name,
                    loaded.kind()
                ))
            }
            ProfileCommands::Rename { profile, new_name } => {
                let profile = resolve_profile(&store, profile)?;
                let old_name = profile.name.clone();
                let renamed = store.rename(&profile.id, new_name)?;
                Ok(format!(
                    "{} Renamed profile '{}' to '{}'",
                    status_mark(true),
                    old_name,
                    renamed.name
                ))
            }
            ProfileCommands::Delete { profile, yes } => {
                let profile = resolve_profile(&store, profile)?;
                if !yes {
                    use dialoguer::Confirm;
                    let confirmed = Confirm::new()
                        .with_prompt(format!("Delete profile '{}'?", profile.name))
                        .interact()
                        .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))?;
                    if !confirmed {
                        return Ok("Deletion cancelled".to_string());
                    }
                }
                store.delete(&profile.id)?;
                Ok(format!("{} Deleted profile '{}'", status_mark(true), profile.name))
            }
            ProfileCommands::Export { profiles, output } => {
                let ids = profiles
                    .iter()
                    .map(|key| resolve_profile(&store, key).map(|p| p.id))
                    .collect::<Result<Vec<ProfileId>, ApiError>>()?;
                let payload = store.export(Some(ids.as_slice()))?;
                match output {
                    Some(path) => {
                        crate::persistence::write_atomic(path, payload.as_bytes())?;
                        let count = if ids.is_empty() { store.count() } else { ids.len() };
                        Ok(format!(
                            "{} Exported {} profile(s) to {}\nThe file contains credentials in plain text.",
                            status_mark(true),
                            count,
                            path.display()
                        ))
                    }
                    None => Ok(payload),
                }
            }
            ProfileCommands::Import { file } => {
                let payload = std::fs::read_to_string(file).map_err(|e| {
                    ApiError::Persistence(format!("Failed to read {}: {}", file.display(), e))
                })?;
                let report = store.import(&payload)?;
                Ok(format_import_report_text(&report))
            }
        }
    }

    fn handle_connection_command(&self, command: &ConnectionCommands) -> Result<String, ApiError> {
        match command {
            ConnectionCommands::Test { all: true, .. } => self.handle_connection_test_all(),
            ConnectionCommands::Test { kind, profile, .. } => {
                let factory = self.app.client_factory();
                let settings: ProviderSettings = match profile {
                    Some(key) => {
                        let store = self.app.profile_store()?;
                        resolve_profile(&store, key)?.connection
                    }
                    None => {
                        let active = self.app.active_configuration();
                        active.settings_for(resolve_kind(kind.as_deref(), active.selected())?)
                    }
                };
                let client = factory.create_with_settings(&settings)?;
                let started = Instant::now();
                self.runtime.block_on(client.initialize())?;
                Ok(format!(
                    "{} {} connection OK ({}ms)",
                    status_mark(true),
                    settings.kind(),
                    started.elapsed().as_millis()
                ))
            }
        }
    }

    fn handle_connection_test_all(&self) -> Result<String, ApiError> {
        let factory = self.app.client_factory();
        let kinds = factory.supported_kinds();
        let checks = kinds.iter().map(|kind| {
            let client = factory.create(*kind);
            async move {
                let client = match client {
                    Ok(client) => client,
                    Err(e) => return Err(e.to_string()),
                };
                let started = Instant::now();
                client
                    .initialize()
                    .await
                    .map(|()| started.elapsed().as_millis())
                    .map_err(|e| e.to_string())
            }
        });
        let results = self.runtime.block_on(futures::future::join_all(checks));

        let mut output = String::new();
        for (kind, result) in kinds.iter().zip(&results) {
            match result {
                Ok(ms) => output.push_str(&format!("{} {} ({}ms)\n", status_mark(true), kind, ms)),
                Err(message) => output.push_str(&format!("{} {}: {}\n", status_mark(false), kind, message)),
            }
        }
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            return Err(ApiError::ProviderFailure(format!(
                "{}{} of {} connection test(s) failed",
                output,
                failed,
                results.len()
            )));
        }
        Ok(output)
    }

    fn handle_data_command(&self, command: &DataCommands) -> Result<String, ApiError> {
        match command {
            DataCommands::List {
                entity,
                fields,
                kind,
                format,
            } => {
                let kind = match kind {
                    Some(kind) => Some(kind.parse::<ProviderKind>()?),
                    None => None,
                };
                let facade = self.app.client_factory().create_crud_facade(kind)?;
                let entity = EntityKind::new(entity.clone()).with_fields(fields.iter().cloned());
                let records = self
                    .runtime
                    .block_on(facade.get_all(&entity))
                    .into_result()
                    .map_err(ApiError::ProviderFailure)?;
                match format.as_str() {
                    "json" => to_pretty_json(&records),
                    _ => Ok(format_records_text(&records, &entity.fields)),
                }
            }
        }
    }
}

fn resolve_kind(kind: Option<&str>, selected: ProviderKind) -> Result<ProviderKind, ApiError> {
    match kind {
        Some(kind) => kind.parse(),
        None => Ok(selected),
    }
}

/// Look a profile up by id first, then by name.
fn resolve_profile(store: &ProfileStore, key: &str) -> Result<Profile, ApiError> {
    store
        .get(&ProfileId::from(key))
        .or_else(|| store.find_by_name(key))
        .ok_or_else(|| ApiError::NotFound(key.to_string()))
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Provider { command } => match command {
            ProviderCommands::List { .. } => "provider list",
            ProviderCommands::Show { .. } => "provider show",
            ProviderCommands::Select { .. } => "provider select",
            ProviderCommands::Set { .. } => "provider set",
            ProviderCommands::Save => "provider save",
            ProviderCommands::Reload => "provider reload",
        },
        Commands::Profile { command } => match command {
            ProfileCommands::List { .. } => "profile list",
            ProfileCommands::Create { .. } => "profile create",
            ProfileCommands::Show { .. } => "profile show",
            ProfileCommands::Load { .. } => "profile load",
            ProfileCommands::Rename { .. } => "profile rename",
            ProfileCommands::Delete { .. } => "profile delete",
            ProfileCommands::Export { .. } => "profile export",
            ProfileCommands::Import { .. } => "profile import",
        },
        Commands::Connection { .. } => "connection test",
        Commands::Data { .. } => "data list",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoragePaths;
    use tempfile::TempDir;

    fn context() -> (CliContext, TempDir) {
        let temp = TempDir::new().unwrap();
        let app = AppContext::with_paths(AppConfig::default(), StoragePaths::in_dir(temp.path()));
        (CliContext::with_app(app).unwrap(), temp)
    }

    fn run(ctx: &CliContext, args: &[&str]) -> Result<String, ApiError> {
        let mut argv = vec!["switchyard"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        ctx.execute(&cli.command)
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = Cli::try_parse_from([
            "switchyard",
            "--config-dir",
            "/tmp/sy",
            "--log-level",
            "debug",
            "provider",
            "list",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.storage.config_dir, Some(PathBuf::from("/tmp/sy")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_resolve_profile_by_id_or_name() {
        let (ctx, _temp) = context();
        let store = ctx.app().profile_store().unwrap();
        let profile = store.create_from_active("Staging", "").unwrap();

        assert_eq!(resolve_profile(&store, profile.id.as_str()).unwrap(), profile);
        assert_eq!(resolve_profile(&store, "staging").unwrap(), profile);
        assert!(matches!(
            resolve_profile(&store, "prod"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_set_on_other_kind_leaves_selection() {
        let (ctx, _temp) = context();
        run(&ctx, &["provider", "set", "endpoint", "https://x.supabase.co", "--kind", "supabase"]).unwrap();

        let active = ctx.app().active_configuration();
        assert_eq!(active.selected(), ProviderKind::Appwrite);
        assert_eq!(
            active.settings_for(ProviderKind::Supabase).endpoint(),
            "https://x.supabase.co"
        );
    }

    #[test]
    fn test_credential_is_masked_in_set_output() {
        let (ctx, _temp) = context();
        let output = run(&ctx, &["provider", "set", "credential", "super-secret-9876"]).unwrap();
        assert!(output.contains("****9876"));
        assert!(!output.contains("super-secret"));
    }

    #[test]
    fn test_data_list_on_mysql_is_unsupported() {
        let (ctx, _temp) = context();
        let err = run(&ctx, &["data", "list", "orders", "--kind", "mysql"]).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedProvider(ProviderKind::MySql)));
    }

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["switchyard", "profile", "export", "a", "b"]).unwrap();
        assert_eq!(command_name(&cli.command), "profile export");
    }
}
