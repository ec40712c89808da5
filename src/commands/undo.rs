use super::status::relative_time;
use super::{describe, Session};
use crate::domain::{format_readable, Entry, UndoOperation};
use crate::ui::{SelectorItem, SelectorState};
use anyhow::{anyhow, Context, Result};
use std::io::Write;
use tracing::info;
use uuid::Uuid;

fn state_word(entry: &Entry) -> &'static str {
    if entry.active {
        "active"
    } else if entry.stashed {
        "stashed"
    } else {
        "stopped"
    }
}

/// Undo history, newest first
fn history_selector(session: &Session) -> SelectorState {
    let headers = ["#", "Operation", "Description", "Time", "Age"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let items = session
        .ledger
        .undo_history
        .iter()
        .rev()
        .enumerate()
        .map(|(n, record)| {
            SelectorItem::new(
                record.id.to_string(),
                vec![
                    format!("#{}", n + 1),
                    record.operation.to_string(),
                    record.description.clone(),
                    record.timestamp.format("%b %d %-I:%M%p").to_string(),
                    relative_time(record.timestamp, session.now),
                ],
            )
        })
        .collect();
    SelectorState::single("Select an operation to undo", headers, items)
}

/// `gt undo`: pick a recorded operation and put its entries back
pub fn run(session: &mut Session, list: bool) -> Result<()> {
    if list {
        if session.ledger.undo_history.is_empty() {
            writeln!(session.out, "No operations available to undo.")?;
            return Ok(());
        }
        let text = serde_json::to_string_pretty(&session.ledger.undo_history)
            .context("Failed to serialize undo history")?;
        writeln!(session.out, "{}", text)?;
        return Ok(());
    }

    if session.ledger.undo_history.is_empty() {
        writeln!(session.out, "No operations to undo.")?;
        return Ok(());
    }

    let state = history_selector(session);
    let Some(chosen) = session.prompt.select(state)?.and_then(|ids| ids.into_iter().next()) else {
        writeln!(session.out, "No operation selected for undo.")?;
        return Ok(());
    };
    let id = Uuid::parse_str(&chosen).map_err(|e| anyhow!("Invalid undo id {}: {}", chosen, e))?;
    let record = session
        .ledger
        .take_undo(id)
        .ok_or_else(|| anyhow!("Undo record {} not found in history", id))?;

    let restored = session.ledger.restore(&record);
    session.touch();
    info!(%id, operation = %record.operation, restored = restored.len(), "operation undone");

    let lines: Vec<String> = restored
        .iter()
        .filter_map(|id| session.ledger.get(*id))
        .map(|e| {
            format!(
                "{} (ID: {}) - {} - {}",
                describe(e),
                e.short_id,
                format_readable(e.current_duration(session.now)),
                state_word(e)
            )
        })
        .collect();

    writeln!(session.out, "Undone: {}", record.description)?;
    match record.operation {
        UndoOperation::Edit => writeln!(
            session.out,
            "Restored {} entries to their original state:",
            lines.len()
        )?,
        UndoOperation::Delete | UndoOperation::Clear => {
            writeln!(session.out, "Restored {} entries:", lines.len())?
        }
    }
    for line in &lines {
        writeln!(session.out, "  • {}", line)?;
    }
    Ok(())
}
