use super::track::backdated_start;
use super::{describe, entry_selector, pick_entries, resolve_target, Resolved, Session};
use crate::domain::{format_readable, Entry, UndoOperation};
use anyhow::{bail, Context, Result};
use std::io::Write;
use tracing::info;
use uuid::Uuid;

fn with_duration(entry: &Entry) -> String {
    format!("{} - {}", describe(entry), format_readable(entry.duration))
}

fn with_id(entry: &Entry) -> String {
    format!(
        "{} (ID: {}) - {}",
        describe(entry),
        entry.short_id,
        format_readable(entry.duration)
    )
}

/// `gt stash`: stop every running entry and park it
pub fn stash(session: &mut Session) -> Result<()> {
    let ids: Vec<Uuid> = session.ledger.active().iter().map(|e| e.id).collect();
    if ids.is_empty() {
        writeln!(session.out, "No entries to stash.")?;
        writeln!(session.out, "Use 'gt stash show' to view existing stashes.")?;
        return Ok(());
    }
    if session.ledger.stash().is_some() {
        bail!("A stash already exists; pop, apply or clear it first (only one stash is supported)");
    }

    let now = session.now;
    let mut lines = Vec::new();
    for id in &ids {
        let mut parked = session.entry(*id)?.clone();
        let keyword = parked.keyword.clone();
        parked
            .stop(now)
            .with_context(|| format!("Cannot stash '{}'", keyword))?;
        parked.stashed = true;
        lines.push(with_duration(&parked));
        if let Some(slot) = session.ledger.get_mut(*id) {
            *slot = parked;
        }
    }
    session.ledger.create_stash(ids.clone(), now);
    session.touch();
    info!(count = ids.len(), "entries stashed");

    writeln!(session.out, "Stashed {} entries:", ids.len())?;
    for line in &lines {
        writeln!(session.out, "  • {}", line)?;
    }
    Ok(())
}

/// `gt stash show`: pick stashed entries to delete
pub fn show(session: &mut Session) -> Result<()> {
    let stashed = session.ledger.stashed();
    if stashed.is_empty() {
        writeln!(session.out, "No stash found.")?;
        return Ok(());
    }

    let state = entry_selector("Select stashed entries to delete", &stashed, session.now, true);
    let ids = pick_entries(session, state)?;
    if ids.is_empty() {
        writeln!(session.out, "No entries selected for deletion.")?;
        return Ok(());
    }
    let question = format!("Are you sure you want to delete {} stashed entries?", ids.len());
    if !session.prompt.confirm(&question)? {
        writeln!(session.out, "Deletion cancelled.")?;
        return Ok(());
    }

    let doomed: Vec<Entry> = ids
        .iter()
        .filter_map(|id| session.ledger.get(*id))
        .cloned()
        .collect();
    let lines: Vec<String> = doomed.iter().map(with_id).collect();
    let description = format!("Deleted {} stashed entries", doomed.len());
    session
        .ledger
        .record_undo(UndoOperation::Delete, description, doomed, session.now);
    let removed = session.ledger.remove(&ids);
    session.touch();
    info!(removed, "stashed entries deleted");

    writeln!(session.out, "Deleted {} stashed entries:", removed)?;
    for line in &lines {
        writeln!(session.out, "  • {}", line)?;
    }
    Ok(())
}

/// `gt stash apply`: keep stashed entries as plain stopped entries
pub fn apply(session: &mut Session) -> Result<()> {
    let mut lines = Vec::new();
    for entry in session.ledger.entries.iter_mut().filter(|e| e.stashed) {
        entry.stashed = false;
        lines.push(with_duration(entry));
    }
    if lines.is_empty() {
        writeln!(session.out, "No stash to apply.")?;
        return Ok(());
    }
    session.ledger.stashes.clear();
    session.touch();
    info!(count = lines.len(), "stash applied");

    writeln!(
        session.out,
        "Applied {} stashed entries (converted to stopped entries):",
        lines.len()
    )?;
    for line in &lines {
        writeln!(session.out, "  • {}", line)?;
    }
    Ok(())
}

/// Stashed entries named by `targets`, all of them when empty
fn pop_targets(session: &Session, targets: &[String]) -> Result<Vec<Uuid>> {
    if targets.is_empty() {
        return Ok(session.ledger.stashed().iter().map(|e| e.id).collect());
    }

    let mut ids = Vec::new();
    for target in targets {
        let found: Vec<Uuid> = match resolve_target(&session.ledger, target)? {
            Resolved::Entry(id) => {
                let entry = session.entry(id)?;
                if !entry.stashed {
                    bail!("Entry with ID {} is not stashed", entry.short_id);
                }
                vec![id]
            }
            Resolved::Keyword(keyword) => session
                .ledger
                .stashed()
                .iter()
                .filter(|e| e.keyword == keyword)
                .map(|e| e.id)
                .collect(),
        };
        if found.is_empty() {
            bail!("No stashed entries found for '{}'", target);
        }
        for id in found {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// `gt pop` / `gt stash pop`: start fresh entries from stashed ones.
///
/// The stashed originals stay behind as completed entries. Keywords that
/// already have a running entry are skipped and stay stashed.
pub fn pop(session: &mut Session, targets: &[String], backdate: Option<&str>) -> Result<()> {
    if session.ledger.stashed().is_empty() {
        writeln!(session.out, "No stash to pop.")?;
        return Ok(());
    }

    let ids = pop_targets(session, targets)?;
    let start = backdated_start(session, backdate)?;

    let mut lines = Vec::new();
    for id in ids {
        let source = session.entry(id)?.clone();
        if session.ledger.has_active_for_keyword(&source.keyword) {
            writeln!(
                session.out,
                "Warning: Skipping '{}' - an active entry for this keyword already exists",
                source.keyword
            )?;
            continue;
        }
        if let Some(original) = session.ledger.get_mut(id) {
            original.stashed = false;
        }
        let resumed = Entry::start_new(source.keyword.clone(), source.tags.clone(), start);
        lines.push(describe(&resumed));
        session.ledger.add_entry(resumed);
    }
    session.ledger.prune_stash();

    if lines.is_empty() {
        writeln!(session.out, "No entries were resumed.")?;
        return Ok(());
    }
    session.touch();
    info!(count = lines.len(), "stash popped");

    writeln!(session.out, "Resumed {} entries:", lines.len())?;
    for line in &lines {
        writeln!(session.out, "  • {}", line)?;
    }
    Ok(())
}

/// `gt stash clear`: delete every stashed entry, keeping an undo record
pub fn clear(session: &mut Session) -> Result<()> {
    let doomed: Vec<Entry> = session.ledger.stashed().into_iter().cloned().collect();
    if doomed.is_empty() {
        writeln!(session.out, "No stash to clear.")?;
        return Ok(());
    }
    let question = format!(
        "Are you sure you want to delete all {} stashed entries?",
        doomed.len()
    );
    if !session.prompt.confirm(&question)? {
        writeln!(session.out, "Clear operation cancelled.")?;
        return Ok(());
    }

    let ids: Vec<Uuid> = doomed.iter().map(|e| e.id).collect();
    let lines: Vec<String> = doomed.iter().map(with_id).collect();
    let description = format!("Cleared {} stashed entries", doomed.len());
    session
        .ledger
        .record_undo(UndoOperation::Clear, description, doomed, session.now);
    let removed = session.ledger.remove(&ids);
    session.ledger.stashes.clear();
    session.touch();
    info!(removed, "stash cleared");

    writeln!(
        session.out,
        "Deleted {} stashed entries. Use 'gt undo' to restore.",
        removed
    )?;
    for line in &lines {
        writeln!(session.out, "  • {}", line)?;
    }
    Ok(())
}
