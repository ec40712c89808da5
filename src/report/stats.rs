use crate::commands::table::Table;
use crate::domain::{format_readable, Entry};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Totals for one keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordStats {
    pub keyword: String,
    pub duration: i64,
    pub entries: usize,
    /// Distinct tags, sorted
    pub tags: Vec<String>,
    /// Seconds per tag; an entry counts toward each of its tags
    pub tag_durations: BTreeMap<String, i64>,
}

/// Per-keyword totals in keyword order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordSummary {
    pub keywords: Vec<KeywordStats>,
    pub total_duration: i64,
    pub total_entries: usize,
}

/// Group entries by keyword; running entries count up to `now`
pub fn summarize_keywords(entries: &[&Entry], now: DateTime<Local>) -> KeywordSummary {
    let mut grouped: BTreeMap<&str, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        grouped.entry(entry.keyword.as_str()).or_default().push(*entry);
    }

    let mut summary = KeywordSummary::default();
    for (keyword, group) in grouped {
        let mut tags = BTreeSet::new();
        let mut tag_durations = BTreeMap::new();
        let mut duration = 0;
        for entry in &group {
            let secs = entry.current_duration(now);
            duration += secs;
            for tag in &entry.tags {
                tags.insert(tag.clone());
                *tag_durations.entry(tag.clone()).or_insert(0) += secs;
            }
        }

        summary.total_duration += duration;
        summary.total_entries += group.len();
        summary.keywords.push(KeywordStats {
            keyword: keyword.to_string(),
            duration,
            entries: group.len(),
            tags: tags.into_iter().collect(),
            tag_durations,
        });
    }
    summary
}

impl KeywordSummary {
    /// Keyword table with a TOTAL footer
    pub fn render(&self) -> String {
        let mut table = Table::new(["Keyword", "Duration", "Entries", "Tags"]);
        for stats in &self.keywords {
            let tags = if stats.tags.is_empty() {
                "-".to_string()
            } else {
                stats.tags.join(", ")
            };
            table.row(vec![
                stats.keyword.clone(),
                format_readable(stats.duration),
                stats.entries.to_string(),
                tags,
            ]);
        }
        table.footer(vec![
            "TOTAL".to_string(),
            format_readable(self.total_duration),
            self.total_entries.to_string(),
            "-".to_string(),
        ]);
        table.render()
    }

    /// Tag breakdown lines under each keyword, only for keywords with tags
    pub fn render_tag_breakdown(&self) -> String {
        let mut out = String::new();
        for stats in self.keywords.iter().filter(|s| !s.tag_durations.is_empty()) {
            out.push_str(&format!("{}\n", stats.keyword));
            for (tag, secs) in &stats.tag_durations {
                out.push_str(&format!("  {:<16} {}\n", tag, format_readable(*secs)));
            }
        }
        out
    }
}
