//! Format providers, profiles and records for the terminal.

use crate::error::ApiError;
use crate::profiles::{ImportReport, Profile};
use crate::provider::{ProviderKind, ProviderSettings, Record};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{json, Value};

/// One line of `provider list`.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRow {
    pub kind: ProviderKind,
    pub selected: bool,
    pub client_available: bool,
    pub endpoint: String,
    pub identifier: String,
}

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn status_mark(ok: bool) -> String {
    if ok {
        format!("{}", "✓".green())
    } else {
        format!("{}", "✗".red())
    }
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render JSON output: {}", e)))
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

pub fn format_provider_list_text(rows: &[ProviderRow]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Providers"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["", "Provider", "Client", "Endpoint", "Identifier"]);
    for row in rows {
        table.add_row(vec![
            if row.selected { "*".to_string() } else { String::new() },
            row.kind.to_string(),
            (if row.client_available { "built-in" } else { "none" }).to_string(),
            or_dash(&row.endpoint),
            or_dash(&row.identifier),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str("\n* selected provider\n");
    out
}

/// Every flattened field of `settings`; the credential is masked unless `show_secrets`.
fn visible_entries(settings: &ProviderSettings, show_secrets: bool) -> Vec<(String, String)> {
    settings
        .entries()
        .into_iter()
        .map(|(name, value)| {
            if name == "credential" && !show_secrets {
                (name, settings.masked_credential())
            } else {
                (name, value)
            }
        })
        .collect()
}

pub fn format_settings_text(settings: &ProviderSettings, selected: bool, show_secrets: bool) -> String {
    let title = if selected {
        format!("{} (selected)", settings.kind())
    } else {
        settings.kind().to_string()
    };
    let mut out = format!("{}\n\n", format_section_heading(&title));
    for (name, value) in visible_entries(settings, show_secrets) {
        out.push_str(&format!("  {:<22} {}\n", name, or_dash(&value)));
    }
    out
}

pub fn settings_json(settings: &ProviderSettings, selected: bool, show_secrets: bool) -> Value {
    let fields: serde_json::Map<String, Value> = visible_entries(settings, show_secrets)
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();
    json!({
        "provider": settings.kind(),
        "selected": selected,
        "fields": fields,
    })
}

pub fn format_profile_list_text(profiles: &[Profile], capacity: usize) -> String {
    if profiles.is_empty() {
        return "No profiles saved.\n\nUse 'switchyard profile create <name>' to snapshot the current settings.\n"
            .to_string();
    }
    let mut out = format!("{}\n\n", format_section_heading("Profiles"));
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Provider", "Endpoint", "Updated", "Id"]);
    for profile in profiles {
        table.add_row(vec![
            profile.name.clone(),
            profile.kind().to_string(),
            or_dash(profile.connection.endpoint()),
            profile.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            profile.id.to_string(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out.push_str(&format!("\nTotal: {} of {} profiles\n", profiles.len(), capacity));
    out
}

pub fn format_profile_text(profile: &Profile, show_secrets: bool) -> String {
    let mut out = format!("{}\n\n", format_section_heading(&profile.name));
    out.push_str(&format!("  {:<22} {}\n", "id", profile.id));
    out.push_str(&format!("  {:<22} {}\n", "description", or_dash(&profile.description)));
    out.push_str(&format!("  {:<22} {}\n", "provider", profile.kind()));
    out.push_str(&format!("  {:<22} {}\n", "created", profile.created_at.to_rfc3339()));
    out.push_str(&format!("  {:<22} {}\n", "updated", profile.updated_at.to_rfc3339()));
    out.push('\n');
    for (name, value) in visible_entries(&profile.connection, show_secrets) {
        out.push_str(&format!("  {:<22} {}\n", name, or_dash(&value)));
    }
    out
}

pub fn format_import_report_text(report: &ImportReport) -> String {
    let mut out = format!(
        "{} Imported {} profile(s)\n",
        status_mark(report.is_complete()),
        report.imported_count()
    );
    for profile in report.imported() {
        out.push_str(&format!("  + {} ({})\n", profile.name, profile.kind()));
    }
    if let Some(message) = report.error_message() {
        out.push_str(&format!("\nSkipped {} entries:\n", report.skipped_count()));
        for line in message.lines() {
            out.push_str(&format!("  - {}\n", line));
        }
    }
    out
}

/// Records as a table. Columns are `fields` when given, otherwise every field seen.
pub fn format_records_text(records: &[Record], fields: &[String]) -> String {
    if records.is_empty() {
        return "No records.\n".to_string();
    }
    let columns: Vec<String> = if fields.is_empty() {
        let mut seen: Vec<String> = Vec::new();
        for record in records {
            for name in record.fields.keys() {
                if !seen.contains(name) {
                    seen.push(name.clone());
                }
            }
        }
        seen
    } else {
        fields.iter().filter(|f| f.as_str() != "id").cloned().collect()
    };

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().cloned());
    table.set_header(header);
    for record in records {
        let mut row = vec![record.id.clone().unwrap_or_else(|| "-".to_string())];
        for column in &columns {
            row.push(match record.get(column) {
                None | Some(Value::Null) => "-".to_string(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            });
        }
        table.add_row(row);
    }
    format!("{}\n\n{} record(s)\n", table, records.len())
}
