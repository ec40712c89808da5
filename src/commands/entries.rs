use super::{describe, entry_selector, pick_entries, resolve_target, Resolved, Session};
use crate::domain::{
    checked_after, checked_before, checked_seconds, format_readable, parse_tags, parse_threshold,
    validate_keyword, Entry, TimeSpan, UndoOperation,
};
use anyhow::{anyhow, bail, Context, Result};
use chrono::Duration;
use std::io::Write;
use tracing::info;
use uuid::Uuid;

/// `gt add`: a completed entry from an hour ago until now, shaped in the editor
pub fn add(session: &mut Session) -> Result<()> {
    let now = session.now;
    let draft = Entry::completed(String::new(), Vec::new(), now - Duration::hours(1), now)?;

    let Some(entry) = session.prompt.edit_entry(&draft, now)? else {
        writeln!(session.out, "Entry creation cancelled.")?;
        return Ok(());
    };

    let status = if entry.active { "running" } else { "completed" };
    let line = format!(
        "Added {} entry: {} - {}",
        status,
        describe(&entry),
        format_readable(entry.current_duration(now))
    );
    let id = entry.id;
    let short_id = session.ledger.add_entry(entry);
    session.touch();
    info!(%id, short_id, "entry added");

    writeln!(session.out, "{}", line)?;
    if session.verbose {
        writeln!(session.out, "Entry ID: {} (Short ID: {})", id, short_id)?;
    }
    Ok(())
}

/// Newest-first list of every entry, for pickers
fn all_entries_selector(session: &Session, title: &str, multi: bool) -> crate::ui::SelectorState {
    let mut entries: Vec<&Entry> = session.ledger.entries.iter().collect();
    entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    entry_selector(title, &entries, session.now, multi)
}

/// Pick the entry `set` works on; `None` when the user backed out
fn choose_for_set(session: &mut Session, target: Option<&str>) -> Result<Option<Uuid>> {
    let Some(target) = target else {
        let state = all_entries_selector(session, "Select entry to edit", false);
        return Ok(pick_entries(session, state)?.into_iter().next());
    };

    match resolve_target(&session.ledger, target)? {
        Resolved::Entry(id) => Ok(Some(id)),
        Resolved::Keyword(keyword) => {
            let entries = session.ledger.for_keyword(&keyword);
            if entries.is_empty() {
                bail!("No entries found for keyword '{}'", keyword);
            }
            if entries.len() == 1 {
                return Ok(Some(entries[0].id));
            }
            let title = format!("Select entry for '{}'", keyword);
            let state = entry_selector(&title, &entries, session.now, false);
            Ok(pick_entries(session, state)?.into_iter().next())
        }
    }
}

/// `gt set`: open the editor, or assign one field directly
pub fn set(
    session: &mut Session,
    target: Option<&str>,
    field: Option<&str>,
    value: &[String],
) -> Result<()> {
    if session.ledger.entries.is_empty() {
        bail!("No entries to set");
    }

    let Some(id) = choose_for_set(session, target)? else {
        writeln!(session.out, "No entry selected.")?;
        return Ok(());
    };

    match field {
        Some(field) => set_field(session, id, field, value),
        None => edit(session, id),
    }
}

fn edit(session: &mut Session, id: Uuid) -> Result<()> {
    let now = session.now;
    let current = session.entry(id)?.clone();
    let Some(edited) = session.prompt.edit_entry(&current, now)? else {
        writeln!(session.out, "Edit cancelled.")?;
        return Ok(());
    };

    let line = describe(&edited);
    let description = format!("Edited entry: {} (ID: {})", describe(&current), current.short_id);
    let entry = session
        .ledger
        .get_mut(id)
        .ok_or_else(|| anyhow!("Entry {} disappeared", id))?;
    *entry = edited;
    session
        .ledger
        .record_undo(UndoOperation::Edit, description, vec![current], now);
    session.ledger.reassign_short_ids();
    session.touch();
    info!(%id, "entry edited");

    writeln!(session.out, "Updated entry: {}", line)?;
    Ok(())
}

fn set_field(session: &mut Session, id: Uuid, field: &str, value: &[String]) -> Result<()> {
    if value.is_empty() {
        bail!("Must provide both field and value");
    }
    let text = value.join(" ");
    let now = session.now;
    let original = session.entry(id)?.clone();
    let entry = session
        .ledger
        .get_mut(id)
        .ok_or_else(|| anyhow!("Entry {} disappeared", id))?;

    let message = match field.to_lowercase().as_str() {
        "keyword" => {
            entry.keyword = validate_keyword(&text)?;
            format!("Updated keyword to: {}", entry.keyword)
        }
        "duration" => {
            let invalid = || format!("Invalid duration value: {}", text);
            let seconds = parse_threshold(&text).with_context(invalid)?;
            let delta = checked_seconds(seconds).with_context(invalid)?;
            let span = if entry.active {
                // A running entry keeps running; its start moves instead
                TimeSpan::Active {
                    start: checked_before(now, delta).with_context(invalid)?,
                }
            } else {
                if seconds <= 0 {
                    bail!("Duration of a completed entry must be positive");
                }
                TimeSpan::Completed {
                    start: entry.start_time,
                    end: checked_after(entry.start_time, delta).with_context(invalid)?,
                    duration: seconds,
                }
            };
            entry.apply(entry.keyword.clone(), entry.tags.clone(), span);
            format!("Updated duration to: {}", format_readable(seconds))
        }
        "tags" => {
            entry.tags = parse_tags(&text);
            format!("Updated tags to: {}", entry.tags.join(", "))
        }
        other => bail!("Unsupported field: {} (supported: keyword, duration, tags)", other),
    };

    let description = format!(
        "Set {} on {} (ID: {})",
        field.to_lowercase(),
        describe(&original),
        original.short_id
    );
    session
        .ledger
        .record_undo(UndoOperation::Edit, description, vec![original], now);
    session.ledger.reassign_short_ids();
    session.touch();
    info!(%id, field, "entry field set");
    writeln!(session.out, "{}", message)?;
    Ok(())
}

/// `gt delete`
pub fn delete(session: &mut Session, target: Option<&str>) -> Result<()> {
    if session.ledger.entries.is_empty() {
        writeln!(session.out, "No entries to delete.")?;
        return Ok(());
    }

    let Some(target) = target else {
        return delete_interactive(session);
    };

    match resolve_target(&session.ledger, target)? {
        Resolved::Entry(id) => {
            let entry = session.entry(id)?.clone();
            let line = format!("Deleted entry: {} (ID: {})", describe(&entry), entry.short_id);
            session
                .ledger
                .record_undo(UndoOperation::Delete, line.clone(), vec![entry], session.now);
            session.ledger.remove(&[id]);
            session.touch();
            info!(%id, "entry deleted");
            writeln!(session.out, "{}", line)?;
        }
        Resolved::Keyword(keyword) => {
            let doomed: Vec<Entry> = session.ledger.for_keyword(&keyword).into_iter().cloned().collect();
            let ids: Vec<Uuid> = doomed.iter().map(|e| e.id).collect();
            if ids.is_empty() {
                bail!("No entries found for keyword '{}'", keyword);
            }
            if ids.len() > 1
                && !session.prompt.confirm(&format!(
                    "Delete all {} entries for keyword '{}'?",
                    ids.len(),
                    keyword
                ))?
            {
                writeln!(session.out, "Deletion cancelled.")?;
                return Ok(());
            }
            let line = format!("Deleted {} entries for keyword '{}'", ids.len(), keyword);
            session
                .ledger
                .record_undo(UndoOperation::Delete, line.clone(), doomed, session.now);
            let removed = session.ledger.remove(&ids);
            session.touch();
            info!(keyword = %keyword, removed, "entries deleted");
            writeln!(session.out, "{}", line)?;
        }
    }
    Ok(())
}

fn delete_interactive(session: &mut Session) -> Result<()> {
    let state = all_entries_selector(session, "Select entries to delete", true);
    let ids = pick_entries(session, state)?;
    if ids.is_empty() {
        writeln!(session.out, "No entries selected for deletion.")?;
        return Ok(());
    }

    let doomed: Vec<Entry> = ids
        .iter()
        .filter_map(|id| session.ledger.get(*id))
        .cloned()
        .collect();
    let lines: Vec<String> = doomed
        .iter()
        .map(|e| format!("{} (ID: {})", describe(e), e.short_id))
        .collect();
    let question = if ids.len() == 1 {
        format!("Delete {}?", lines.join(""))
    } else {
        format!("Are you sure you want to delete {} entries?", ids.len())
    };
    if !session.prompt.confirm(&question)? {
        writeln!(session.out, "Deletion cancelled.")?;
        return Ok(());
    }

    let description = format!("Deleted {} entries", doomed.len());
    session
        .ledger
        .record_undo(UndoOperation::Delete, description, doomed, session.now);
    let removed = session.ledger.remove(&ids);
    session.touch();
    info!(removed, "entries deleted");
    writeln!(session.out, "Deleted {} entries:", removed)?;
    for line in &lines {
        writeln!(session.out, "  • {}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::*;
    use crate::domain::{format_timestamp, Ledger};
    use crate::editor::FieldName;
    use pretty_assertions::assert_eq;

    const NOW: &str = "2025-08-08 12:00:00";

    fn sample() -> Ledger {
        ledger_of(vec![
            finished("coding", &["rust"], "2025-08-08 08:00:00", "2025-08-08 09:00:00"),
            finished("coding", &[], "2025-08-08 09:30:00", "2025-08-08 10:00:00"),
            running("meeting", &[], "2025-08-08 11:00:00"),
        ])
    }

    #[test]
    fn test_add_through_editor() {
        let mut prompt = ScriptedPrompt::default();
        prompt.edits.push_back(vec![
            (FieldName::Keyword, "review".into()),
            (FieldName::Tags, "pr, docs".into()),
        ]);
        let (ledger, dirty, out) = with_session(Ledger::default(), NOW, &mut prompt, add);

        assert!(dirty);
        assert_eq!(out, "Added completed entry: review [pr docs] - 1h 00m 00s\n");
        let entry = &ledger.entries[0];
        assert_eq!(format_timestamp(&entry.start_time), "2025-08-08 11:00:00");
        assert_eq!(entry.short_id, 1);
    }

    #[test]
    fn test_add_rejects_empty_keyword() {
        let mut out = Vec::new();
        let mut prompt = ScriptedPrompt::default();
        prompt.edits.push_back(vec![]);
        let mut session = Session::new(Ledger::default(), at(NOW), &mut prompt, &mut out);

        let err = add(&mut session).unwrap_err();
        assert_eq!(err.to_string(), "keyword cannot be empty");
        assert!(session.ledger.entries.is_empty());
    }

    #[test]
    fn test_set_direct_fields() {
        let mut prompt = ScriptedPrompt::default();
        let (ledger, _, out) = with_session(sample(), NOW, &mut prompt, |s| {
            // short id 2 is the 09:30 coding entry
            set(s, Some("2"), Some("duration"), &["1h".into()])?;
            set(s, Some("2"), Some("TAGS"), &["a,".into(), "b".into()])?;
            set(s, Some("meeting"), Some("duration"), &["90m".into()])?;
            set(s, Some("meeting"), Some("keyword"), &["standup".into()])
        });

        assert_eq!(
            out,
            "Updated duration to: 1h 00m 00s\nUpdated tags to: a, b\nUpdated duration to: 1h 30m 00s\nUpdated keyword to: standup\n"
        );
        let coding = ledger.by_short_id(2).unwrap();
        assert_eq!(coding.end_time.map(|e| format_timestamp(&e)).as_deref(), Some("2025-08-08 10:30:00"));
        assert_eq!(coding.duration, 3600);
        assert_eq!(coding.tags, vec!["a", "b"]);

        let standup = ledger.by_short_id(1).unwrap();
        assert_eq!(standup.keyword, "standup");
        assert!(standup.active);
        assert_eq!(format_timestamp(&standup.start_time), "2025-08-08 10:30:00");
    }

    #[test]
    fn test_set_errors() {
        let mut out = Vec::new();
        let mut prompt = ScriptedPrompt::default();
        let mut session = Session::new(sample(), at(NOW), &mut prompt, &mut out);

        let err = set(&mut session, Some("1"), Some("colour"), &["red".into()]).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported field: colour (supported: keyword, duration, tags)");
        let err = set(&mut session, Some("1"), Some("keyword"), &[]).unwrap_err();
        assert_eq!(err.to_string(), "Must provide both field and value");
        let err = set(&mut session, Some("2"), Some("duration"), &["0".into()]).unwrap_err();
        assert_eq!(err.to_string(), "Duration of a completed entry must be positive");
        let err = set(&mut session, Some("2"), Some("duration"), &["99999999999999999".into()]).unwrap_err();
        assert_eq!(format!("{:#}", err), "Invalid duration value: 99999999999999999: time is out of range");
        let err = set(&mut session, Some("1"), Some("duration"), &["9999999999999".into()]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid duration value: 9999999999999");
        let err = set(&mut session, Some("absent"), None, &[]).unwrap_err();
        assert_eq!(err.to_string(), "No entries found for keyword 'absent'");
        assert!(!session.is_dirty());

        let mut empty_prompt = ScriptedPrompt::default();
        let mut out = Vec::new();
        let mut empty = Session::new(Ledger::default(), at(NOW), &mut empty_prompt, &mut out);
        assert_eq!(set(&mut empty, None, None, &[]).unwrap_err().to_string(), "No entries to set");
    }

    #[test]
    fn test_set_keyword_with_several_entries_asks_which() {
        let ledger = sample();
        let older = ledger.by_short_id(3).unwrap().id;

        let mut prompt = ScriptedPrompt::default();
        prompt.selections.push_back(Some(vec![older.to_string()]));
        prompt.edits.push_back(vec![(FieldName::EndTime, "2025-08-08 08:45:00".into())]);
        let (ledger, dirty, out) = with_session(ledger, NOW, &mut prompt, |s| set(s, Some("coding"), None, &[]));

        assert!(dirty);
        assert_eq!(out, "Updated entry: coding [rust]\n");
        assert_eq!(ledger.get(older).unwrap().duration, 2700);
        assert_eq!(prompt.shown[0].items.len(), 2);
        assert!(!prompt.shown[0].multi);
    }

    #[test]
    fn test_set_edit_cancelled_selection() {
        let mut prompt = ScriptedPrompt::default();
        prompt.selections.push_back(None);
        let (_, dirty, out) = with_session(sample(), NOW, &mut prompt, |s| set(s, None, None, &[]));
        assert!(!dirty);
        assert_eq!(out, "No entry selected.\n");
    }

    #[test]
    fn test_delete_by_id_and_keyword() {
        let mut prompt = ScriptedPrompt::default();
        prompt.confirms.push_back(true);
        let (ledger, dirty, out) = with_session(sample(), NOW, &mut prompt, |s| {
            delete(s, Some("1"))?;
            delete(s, Some("coding"))
        });

        assert!(dirty);
        assert!(ledger.entries.is_empty());
        assert_eq!(
            out,
            "Deleted entry: meeting (ID: 1)\nDeleted 2 entries for keyword 'coding'\n"
        );
        assert_eq!(prompt.confirm_messages, vec!["Delete all 2 entries for keyword 'coding'?"]);

        let recorded: Vec<(UndoOperation, &str, usize)> = ledger
            .undo_history
            .iter()
            .map(|r| (r.operation, r.description.as_str(), r.entries.len()))
            .collect();
        assert_eq!(
            recorded,
            vec![
                (UndoOperation::Delete, "Deleted entry: meeting (ID: 1)", 1),
                (UndoOperation::Delete, "Deleted 2 entries for keyword 'coding'", 2),
            ]
        );
    }

    #[test]
    fn test_set_records_pre_edit_copy() {
        let ledger = sample();
        let before = ledger.by_short_id(2).unwrap().clone();
        let mut prompt = ScriptedPrompt::default();
        prompt.edits.push_back(vec![(FieldName::Keyword, "review".into())]);
        let (ledger, _, _) = with_session(ledger, NOW, &mut prompt, |s| {
            set(s, Some("2"), Some("Tags"), &["docs".into()])?;
            set(s, Some("2"), None, &[])
        });

        let history = &ledger.undo_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].operation, UndoOperation::Edit);
        assert_eq!(history[0].description, "Set tags on coding (ID: 2)");
        assert_eq!(history[0].entries, vec![before]);
        assert_eq!(history[1].description, "Edited entry: coding [docs] (ID: 2)");
        assert_eq!(history[1].entries[0].tags, vec!["docs"]);
    }

    #[test]
    fn test_delete_interactive_cancel() {
        let ledger = sample();
        let id = ledger.by_short_id(1).unwrap().id;
        let mut prompt = ScriptedPrompt::default();
        prompt.selections.push_back(Some(vec![id.to_string()]));
        prompt.confirms.push_back(false);

        let (ledger, dirty, out) = with_session(ledger, NOW, &mut prompt, |s| delete(s, None));
        assert!(!dirty);
        assert_eq!(ledger.entries.len(), 3);
        assert_eq!(out, "Deletion cancelled.\n");
        assert_eq!(prompt.confirm_messages, vec!["Delete meeting (ID: 1)?"]);
        assert!(ledger.undo_history.is_empty());
    }
}
