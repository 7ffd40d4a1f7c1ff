//! Table and JSON rendering for command output

use std::collections::{BTreeMap, HashMap};

use clap::ValueEnum;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use stocktrail_core::audit::models::format_timestamp;
use stocktrail_core::audit::{Actor, HistoryPage, LastChange};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

fn actor_label(actor: &Actor) -> String {
    format!("{} (#{})", actor.name, actor.id)
}

pub fn render_history(page: &HistoryPage, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(page)?));
    }

    if page.entries.is_empty() {
        return Ok("No recorded changes\n".to_string());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["id", "entity", "when", "action", "actor", "changes"]);

    for entry in &page.entries {
        let changes: Vec<String> = entry.changes.iter().map(ToString::to_string).collect();
        table.add_row(vec![
            entry.id.to_string(),
            entry.entity_id.to_string(),
            format_timestamp(&entry.occurred_at),
            entry.action.to_string(),
            actor_label(&entry.actor),
            changes.join("\n"),
        ]);
    }

    let meta = &page.pagination;
    Ok(format!(
        "{table}\nPage {} of {} ({} changes)\n",
        meta.page,
        meta.pages.max(1),
        meta.total
    ))
}

/// One row per requested id, in request order; ids never changed show `-`
pub fn render_latest(
    ids: &[i64],
    latest: &HashMap<i64, LastChange>,
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        let ordered: BTreeMap<i64, Option<&LastChange>> =
            ids.iter().map(|id| (*id, latest.get(id))).collect();
        return Ok(format!("{}\n", serde_json::to_string_pretty(&ordered)?));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["entity", "when", "action", "actor"]);

    for id in ids {
        let row = match latest.get(id) {
            Some(change) => vec![
                id.to_string(),
                format_timestamp(&change.occurred_at),
                change.action.to_string(),
                actor_label(&change.actor),
            ],
            None => vec![id.to_string(), "-".into(), "-".into(), "-".into()],
        };
        table.add_row(row);
    }

    Ok(format!("{table}\n"))
}
