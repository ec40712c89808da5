use super::table::Table;
use super::{format_clock, status_text, tags_text, Session};
use crate::domain::{format_readable, Entry, EntryFilter, TimeRange};
use crate::report::summarize_keywords;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::Write;

const RECENT_LIMIT: usize = 5;

/// "5m ago" style distance from `now`
pub fn relative_time(t: DateTime<Local>, now: DateTime<Local>) -> String {
    let diff = now - t;
    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() == 1 {
        "yesterday".to_string()
    } else {
        format!("{}d ago", diff.num_days())
    }
}

fn when(entry: &Entry, now: DateTime<Local>) -> String {
    match entry.end_time {
        Some(end) if !entry.active && !entry.stashed => relative_time(end, now),
        _ => status_text(entry).to_string(),
    }
}

/// Summary shown by a bare `gt`
pub fn run(session: &mut Session) -> Result<()> {
    let now = session.now;
    let mut out = String::new();

    let recent = session.ledger.recent(RECENT_LIMIT);
    if !recent.is_empty() {
        let mut table = Table::new(["ID", "Keyword", "Duration", "Tags", "When"]);
        for e in &recent {
            table.row(vec![
                e.short_id.to_string(),
                e.keyword.clone(),
                format_readable(e.current_duration(now)),
                tags_text(&e.tags),
                when(e, now),
            ]);
        }
        out.push_str("RECENT ENTRIES\n");
        out.push_str(&table.render());
        out.push('\n');
    }

    let today = EntryFilter {
        range: TimeRange::Today,
        active: Some(false),
        ..EntryFilter::default()
    };
    let completed = today.apply(&session.ledger.entries, now);
    out.push_str("TODAY'S REPORT\n");
    if completed.is_empty() {
        out.push_str("No completed entries for today\n");
    } else {
        out.push_str(&summarize_keywords(&completed, now).render());
    }

    let active = session.ledger.active();
    out.push('\n');
    if active.is_empty() {
        out.push_str("No active timers running\n");
    } else {
        let mut table = Table::new(["ID", "Keyword", "Duration", "Tags", "Started"]);
        for e in &active {
            table.row(vec![
                e.short_id.to_string(),
                e.keyword.clone(),
                format_readable(e.current_duration(now)),
                tags_text(&e.tags),
                format_clock(&e.start_time),
            ]);
        }
        out.push_str("ACTIVE TIMERS\n");
        out.push_str(&table.render());
    }

    write!(session.out, "{}", out)?;
    Ok(())
}
