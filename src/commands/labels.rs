use super::table::Table;
use super::Session;
use crate::domain::{Entry, UndoOperation};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::info;

#[derive(Serialize)]
struct LabelCount<'a> {
    name: &'a str,
    count: usize,
}

fn print_counts(session: &mut Session, heading: &str, counts: &BTreeMap<String, usize>, json: bool) -> Result<()> {
    if json {
        let rows: Vec<LabelCount> = counts
            .iter()
            .map(|(name, count)| LabelCount { name, count: *count })
            .collect();
        let text = serde_json::to_string_pretty(&rows).context("Failed to serialize counts")?;
        writeln!(session.out, "{}", text)?;
        return Ok(());
    }
    if counts.is_empty() {
        writeln!(session.out, "No {} found", heading.to_lowercase())?;
        return Ok(());
    }

    let mut table = Table::new([heading, "Entries"]);
    for (name, count) in counts {
        table.row(vec![name.clone(), count.to_string()]);
    }
    write!(session.out, "{}", table.render())?;
    Ok(())
}

pub fn list_keywords(session: &mut Session, json: bool) -> Result<()> {
    let counts = session.ledger.keyword_counts();
    print_counts(session, "Keywords", &counts, json)
}

pub fn list_tags(session: &mut Session, json: bool) -> Result<()> {
    let counts = session.ledger.tag_counts();
    print_counts(session, "Tags", &counts, json)
}

/// Copies of every entry carrying `tag`, taken before a bulk change
fn tagged(session: &Session, tag: &str) -> Vec<Entry> {
    session
        .ledger
        .entries
        .iter()
        .filter(|e| e.has_tag(tag))
        .cloned()
        .collect()
}

pub fn rename_tag(session: &mut Session, old: &str, new: &str) -> Result<()> {
    let new = new.trim();
    if new.is_empty() {
        bail!("New tag name cannot be empty");
    }
    if old == new {
        bail!("Old and new tag names are the same");
    }
    let before = tagged(session, old);
    let touched = session.ledger.rename_tag(old, new);
    if touched == 0 {
        bail!("Tag '{}' not found", old);
    }
    let message = format!("Renamed tag '{}' to '{}' in {} entries", old, new, touched);
    session
        .ledger
        .record_undo(UndoOperation::Edit, message.clone(), before, session.now);
    session.touch();
    info!(old, new, touched, "tag renamed");
    writeln!(session.out, "{}", message)?;
    Ok(())
}

pub fn remove_tag(session: &mut Session, tag: &str) -> Result<()> {
    let before = tagged(session, tag);
    let touched = session.ledger.remove_tag(tag);
    if touched == 0 {
        bail!("Tag '{}' not found", tag);
    }
    let message = format!("Removed tag '{}' from {} entries", tag, touched);
    session
        .ledger
        .record_undo(UndoOperation::Edit, message.clone(), before, session.now);
    session.touch();
    info!(tag, touched, "tag removed");
    writeln!(session.out, "{}", message)?;
    Ok(())
}
