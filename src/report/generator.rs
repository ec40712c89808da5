use crate::domain::{format_readable, Entry, TimeRange};
use crate::report::stats::{summarize_keywords, KeywordSummary};
use crate::commands::table::Table;
use crate::commands::{format_clock, tags_text};
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, Local};
use serde::Serialize;

/// Report heading for the range as seen from `now`
pub fn report_title(range: &TimeRange, now: DateTime<Local>) -> String {
    let today = now.date_naive();
    match range {
        TimeRange::Today => format!("Today's Report ({})", today.format("%b %-d, %Y")),
        TimeRange::Yesterday => format!(
            "Yesterday's Report ({})",
            (today - Duration::days(1)).format("%b %-d, %Y")
        ),
        TimeRange::Week => {
            let sunday = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
            let saturday = sunday + Duration::days(6);
            format!(
                "Weekly Report ({} - {})",
                sunday.format("%b %-d"),
                saturday.format("%b %-d, %Y")
            )
        }
        TimeRange::Month => format!("Monthly Report ({})", today.format("%B %Y")),
        TimeRange::Year => format!("Yearly Report ({})", today.year()),
        TimeRange::Days(n) => format!("Last {} Days Report", n),
        TimeRange::Between { from, to } => match (from, to) {
            (Some(from), Some(to)) => format!(
                "Custom Report ({} - {})",
                from.format("%b %-d"),
                // `to` is the exclusive bound after the last included day
                (*to - Duration::days(1)).format("%b %-d, %Y")
            ),
            _ => "Time Tracking Report".to_string(),
        },
        TimeRange::All => "Time Tracking Report".to_string(),
    }
}

/// Short machine name for the range
pub fn range_name(range: &TimeRange) -> String {
    match range {
        TimeRange::All => "all".to_string(),
        TimeRange::Today => "today".to_string(),
        TimeRange::Yesterday => "yesterday".to_string(),
        TimeRange::Week => "week".to_string(),
        TimeRange::Month => "month".to_string(),
        TimeRange::Year => "year".to_string(),
        TimeRange::Days(n) => format!("last_{}_days", n),
        TimeRange::Between { .. } => "custom".to_string(),
    }
}

/// Human-readable report over already filtered entries
pub fn render_text(entries: &[&Entry], range: &TimeRange, now: DateTime<Local>) -> String {
    if entries.is_empty() {
        return "No entries found for the specified criteria\n".to_string();
    }

    let title = report_title(range, now).to_uppercase();
    let mut report = String::new();
    report.push_str(&format!("{}\n{}\n\n", title, "=".repeat(title.chars().count())));

    let (active, completed): (Vec<&Entry>, Vec<&Entry>) = entries.iter().copied().partition(|e| e.active);

    let completed_summary = summarize_keywords(&completed, now);
    if !completed.is_empty() {
        report.push_str("COMPLETED ENTRIES\n");
        report.push_str(&completed_summary.render());
        let breakdown = completed_summary.render_tag_breakdown();
        if !breakdown.is_empty() {
            report.push_str("\nBY TAG\n");
            report.push_str(&breakdown);
        }
        report.push('\n');
    }

    let active_duration: i64 = active.iter().map(|e| e.current_duration(now)).sum();
    if !active.is_empty() {
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
        report.push_str("ACTIVE ENTRIES\n");
        report.push_str(&table.render());
        report.push('\n');
    }

    let completed_duration = completed_summary.total_duration;
    if active.is_empty() {
        report.push_str(&format!("TOTAL: {}\n", format_readable(completed_duration)));
    } else {
        report.push_str(&format!(
            "GRAND TOTAL: {} ({} completed + {} active)\n",
            format_readable(completed_duration + active_duration),
            format_readable(completed_duration),
            format_readable(active_duration)
        ));
    }
    report
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    title: String,
    time_range: String,
    completed: KeywordSummary,
    active_entries: Vec<&'a Entry>,
    total_duration: i64,
    completed_duration: i64,
    active_duration: i64,
}

/// Same report as pretty JSON, durations in seconds
pub fn render_json(entries: &[&Entry], range: &TimeRange, now: DateTime<Local>) -> Result<String> {
    let (active, completed): (Vec<&Entry>, Vec<&Entry>) = entries.iter().copied().partition(|e| e.active);
    let summary = summarize_keywords(&completed, now);
    let active_duration: i64 = active.iter().map(|e| e.current_duration(now)).sum();

    let report = JsonReport {
        title: report_title(range, now),
        time_range: range_name(range),
        completed_duration: summary.total_duration,
        total_duration: summary.total_duration + active_duration,
        active_duration,
        completed: summary,
        active_entries: active,
    };
    let mut json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    json.push('\n');
    Ok(json)
}
