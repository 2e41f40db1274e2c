use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

const MESSAGE_SCHEMA: &str = "https://schemas.3leaps.dev/qbrowse/cli/v1/message.schema.json";
const CONFIG_SCHEMA: &str =
    "https://schemas.3leaps.dev/qbrowse/cli/v1/connection-config.schema.json";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One browsed message, already decoded for display.
#[derive(Debug, Serialize)]
pub struct MessageRow {
    pub index: usize,
    pub id: Option<String>,
    /// Content kind name, or `"none"` for bodies with no renderable content.
    pub kind: &'static str,
    pub properties: String,
    pub content: String,
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: &'a str,
    queue: &'a str,
    #[serde(flatten)]
    row: &'a MessageRow,
}

#[derive(Serialize)]
struct ConfigEntry<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct ConfigOutput<'a> {
    schema_id: &'a str,
    queue: &'a str,
    entries: Vec<ConfigEntry<'a>>,
}

/// Print browsed messages. JSON is one object per line.
pub fn print_messages(queue: &str, rows: &[MessageRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for row in rows {
                let out = MessageOutput {
                    schema_id: MESSAGE_SCHEMA,
                    queue,
                    row,
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "ID", "KIND", "PROPERTIES", "CONTENT"]);
            for row in rows {
                table.add_row(vec![
                    row.index.to_string(),
                    row.id.clone().unwrap_or_default(),
                    row.kind.to_string(),
                    row.properties.clone(),
                    row.content.clone(),
                ]);
            }
            println!("{table}");
            println!("{} message(s) in {queue}", rows.len());
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "[{}] id={} kind={} properties={{{}}} content={}",
                    row.index,
                    row.id.as_deref().unwrap_or("-"),
                    row.kind,
                    row.properties,
                    row.content
                );
            }
        }
    }
}

/// Print a resolved directory configuration. Values must already be redacted.
pub fn print_config(queue: &str, entries: &[(String, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ConfigOutput {
                schema_id: CONFIG_SCHEMA,
                queue,
                entries: entries
                    .iter()
                    .map(|(key, value)| ConfigEntry { key, value })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KEY", "VALUE"]);
            for (key, value) in entries {
                table.add_row(vec![key.as_str(), value.as_str()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (key, value) in entries {
                println!("{key}={value}");
            }
        }
    }
}
