use super::table::Table;
use super::{format_clock, status_text, tags_text, Session};
use crate::domain::{format_readable, EntryFilter};
use anyhow::{Context, Result};
use std::io::Write;

/// `gt list`: matching entries, oldest first
pub fn run(session: &mut Session, filter: &EntryFilter, json: bool) -> Result<()> {
    let now = session.now;
    let entries = filter.apply(&session.ledger.entries, now);

    if json {
        let text = serde_json::to_string_pretty(&entries).context("Failed to serialize entries")?;
        writeln!(session.out, "{}", text)?;
        return Ok(());
    }
    if entries.is_empty() {
        writeln!(session.out, "No entries match the specified criteria")?;
        return Ok(());
    }

    let mut table = Table::new(["ID", "Keyword", "Duration", "Tags", "Started", "Status"]);
    for e in &entries {
        table.row(vec![
            e.short_id.to_string(),
            e.keyword.clone(),
            format_readable(e.current_duration(now)),
            tags_text(&e.tags),
            format_clock(&e.start_time),
            status_text(e).to_string(),
        ]);
    }
    write!(session.out, "{}", table.render())?;
    Ok(())
}
