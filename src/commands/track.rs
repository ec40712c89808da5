use super::{describe, entry_selector, pick_entries, resolve_target, Resolved, Session};
use crate::domain::{
    checked_before, format_readable, parse_human_duration, parse_tags, validate_keyword, Entry,
};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Local, Months};
use std::collections::HashMap;
use std::io::Write;
use tracing::info;
use uuid::Uuid;

fn clock(session: &Session) -> String {
    session.now.format("%-I:%M %p").to_string()
}

/// `now`, moved back by an optional `--backdate` offset
pub(super) fn backdated_start(session: &Session, backdate: Option<&str>) -> Result<DateTime<Local>> {
    let offset = match backdate {
        Some(text) => parse_human_duration(text)?,
        None => Duration::zero(),
    };
    checked_before(session.now, offset)
        .with_context(|| format!("Cannot backdate by {}", backdate.unwrap_or_default()))
}

/// Start a new timer
pub fn start(
    session: &mut Session,
    keyword: Option<String>,
    tags: Vec<String>,
    backdate: Option<&str>,
) -> Result<()> {
    let (raw_keyword, tags) = match keyword {
        Some(k) => (k, tags.iter().flat_map(|t| parse_tags(t)).collect()),
        None => match session.prompt.start_input()? {
            Some(answer) => answer,
            None => {
                writeln!(session.out, "Cancelled.")?;
                return Ok(());
            }
        },
    };

    let keyword = validate_keyword(&raw_keyword)?;
    if session.ledger.has_active_for_keyword(&keyword) {
        bail!(
            "An active stopwatch for keyword '{}' is already running. Stop it first, then use 'gt continue {}' to resume.",
            keyword,
            keyword
        );
    }

    let start = backdated_start(session, backdate)?;
    let entry = Entry::start_new(keyword, tags, start);
    let summary = describe(&entry);
    let id = entry.id;
    let short_id = session.ledger.add_entry(entry);
    session.touch();
    info!(%id, short_id, "timer started");

    writeln!(session.out, "Started: {} at {}", summary, start.format("%-I:%M %p"))?;
    if session.verbose {
        writeln!(session.out, "Entry ID: {} (Short ID: {})", id, short_id)?;
    }
    Ok(())
}

fn stop_one(session: &mut Session, id: Uuid) -> Result<String> {
    let now = session.now;
    let keyword = session.entry(id)?.keyword.clone();
    session
        .ledger
        .stop(id, now)
        .with_context(|| format!("Cannot stop '{}'", keyword))?;
    session.touch();
    let entry = session.entry(id)?;
    info!(%id, duration = entry.duration, "timer stopped");
    Ok(format!("{} - {}", describe(entry), format_readable(entry.duration)))
}

/// Stop by keyword, short id, all, or pick interactively
pub fn stop(session: &mut Session, target: Option<&str>, all: bool) -> Result<()> {
    if all {
        let ids: Vec<Uuid> = session.ledger.active().iter().map(|e| e.id).collect();
        if ids.is_empty() {
            writeln!(session.out, "No active entries to stop")?;
            return Ok(());
        }
        for id in &ids {
            let line = stop_one(session, *id)?;
            writeln!(session.out, "Stopped: {}", line)?;
        }
        writeln!(session.out, "Stopped {} entries", ids.len())?;
        return Ok(());
    }

    let Some(target) = target else {
        return stop_interactive(session);
    };

    let id = match resolve_target(&session.ledger, target)? {
        Resolved::Entry(id) => {
            let entry = session.entry(id)?;
            if !entry.active {
                bail!("Entry with ID {} is already stopped", entry.short_id);
            }
            id
        }
        Resolved::Keyword(keyword) => {
            let mut active = session.ledger.active_for_keyword(&keyword);
            active.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            match active.first() {
                Some(entry) => entry.id,
                None => bail!("No active entry found for keyword '{}'", keyword),
            }
        }
    };

    let line = stop_one(session, id)?;
    writeln!(session.out, "Stopped: {}", line)?;
    Ok(())
}

fn stop_interactive(session: &mut Session) -> Result<()> {
    let active = session.ledger.active();
    if active.is_empty() {
        writeln!(session.out, "No active entries to stop.")?;
        return Ok(());
    }

    let state = entry_selector("Select entries to stop", &active, session.now, true);
    let ids = pick_entries(session, state)?;
    if ids.is_empty() {
        writeln!(session.out, "No entries selected for stopping.")?;
        return Ok(());
    }
    if ids.len() > 1
        && !session
            .prompt
            .confirm(&format!("Are you sure you want to stop {} entries?", ids.len()))?
    {
        writeln!(session.out, "Operation cancelled.")?;
        return Ok(());
    }

    let mut lines = Vec::new();
    for id in &ids {
        lines.push(stop_one(session, *id)?);
    }
    if let [line] = lines.as_slice() {
        writeln!(session.out, "Stopped: {}", line)?;
    } else {
        writeln!(session.out, "Stopped {} entries:", lines.len())?;
        for line in &lines {
            writeln!(session.out, "  • {}", line)?;
        }
    }
    Ok(())
}

/// Start a fresh entry with the keyword and tags of `source`
fn continue_from(session: &mut Session, source: Uuid) -> Result<String> {
    let source = session.entry(source)?;
    let entry = Entry::start_new(source.keyword.clone(), source.tags.clone(), session.now);
    let line = describe(&entry);
    let id = entry.id;
    let short_id = session.ledger.add_entry(entry);
    session.touch();
    info!(%id, short_id, "timer continued");
    Ok(line)
}

fn ensure_idle(session: &Session, keyword: &str) -> Result<()> {
    if session.ledger.has_active_for_keyword(keyword) {
        bail!("An active stopwatch for keyword '{}' is already running", keyword);
    }
    Ok(())
}

/// `gt continue`
pub fn resume(session: &mut Session, target: Option<&str>, last: bool) -> Result<()> {
    let source = if last {
        let latest = session
            .ledger
            .entries
            .iter()
            .filter(|e| !e.active && !e.stashed)
            .max_by_key(|e| e.start_time);
        match latest {
            Some(entry) => {
                ensure_idle(session, &entry.keyword)?;
                entry.id
            }
            None => bail!("No previous entries found to continue"),
        }
    } else {
        let Some(target) = target else {
            return resume_interactive(session);
        };
        match resolve_target(&session.ledger, target)? {
            Resolved::Entry(id) => {
                let entry = session.entry(id)?;
                if entry.active {
                    bail!("Entry with ID {} is already running", entry.short_id);
                }
                ensure_idle(session, &entry.keyword)?;
                id
            }
            Resolved::Keyword(keyword) => match session.ledger.latest_for_keyword(&keyword) {
                None => bail!("No previous entries found for keyword '{}'", keyword),
                Some(entry) if entry.active => {
                    bail!("Entry for keyword '{}' is already running", keyword)
                }
                Some(entry) => {
                    ensure_idle(session, &keyword)?;
                    entry.id
                }
            },
        }
    };

    let line = continue_from(session, source)?;
    let at = clock(session);
    writeln!(session.out, "Continued: {} at {}", line, at)?;
    Ok(())
}

fn resume_interactive(session: &mut Session) -> Result<()> {
    if session.ledger.entries.is_empty() {
        writeln!(session.out, "No previous entries found to continue.")?;
        return Ok(());
    }

    let since = session
        .now
        .checked_sub_months(Months::new(1))
        .unwrap_or(session.now);
    let mut latest: HashMap<&str, &Entry> = HashMap::new();
    for entry in &session.ledger.entries {
        if entry.active
            || entry.stashed
            || entry.start_time <= since
            || session.ledger.has_active_for_keyword(&entry.keyword)
        {
            continue;
        }
        let slot = latest.entry(entry.keyword.as_str()).or_insert(entry);
        if entry.start_time > slot.start_time {
            *slot = entry;
        }
    }

    if latest.is_empty() {
        writeln!(session.out, "No entries from the last month available to continue.")?;
        writeln!(session.out, "(Keywords with active timers are not shown)")?;
        return Ok(());
    }

    let mut candidates: Vec<&Entry> = latest.into_values().collect();
    candidates.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    let state = entry_selector(
        "Select keywords to continue",
        &candidates,
        session.now,
        true,
    );

    let ids = pick_entries(session, state)?;
    if ids.is_empty() {
        writeln!(session.out, "No keywords selected for continuation.")?;
        return Ok(());
    }
    if ids.len() > 1
        && !session.prompt.confirm(&format!(
            "Are you sure you want to continue {} keywords?",
            ids.len()
        ))?
    {
        writeln!(session.out, "Operation cancelled.")?;
        return Ok(());
    }

    let mut lines = Vec::new();
    for id in ids {
        lines.push(continue_from(session, id)?);
    }
    if let [line] = lines.as_slice() {
        writeln!(session.out, "Continued: {}", line)?;
    } else {
        writeln!(session.out, "Continued {} entries:", lines.len())?;
        for line in &lines {
            writeln!(session.out, "  • {}", line)?;
        }
    }
    Ok(())
}
