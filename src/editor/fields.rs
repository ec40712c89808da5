use super::mode::{InputMode, ModeInput};
use crate::domain::{
    format_hms, format_timestamp, parse_hms, parse_timestamp, Entry, TimeSpan,
};
use chrono::{DateTime, Local};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Keyword,
    Tags,
    Duration,
    StartTime,
    EndTime,
}

/// What kind of text a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Tags,
    Duration,
    Timestamp,
}

impl FieldName {
    pub fn label(self) -> &'static str {
        match self {
            Self::Keyword => "Keyword",
            Self::Tags => "Tags",
            Self::Duration => "Duration",
            Self::StartTime => "Start Time",
            Self::EndTime => "End Time",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::Keyword => FieldKind::Text,
            Self::Tags => FieldKind::Tags,
            Self::Duration => FieldKind::Duration,
            Self::StartTime | Self::EndTime => FieldKind::Timestamp,
        }
    }

    /// Duration or timestamp
    pub fn is_time(self) -> bool {
        matches!(self.kind(), FieldKind::Duration | FieldKind::Timestamp)
    }

    /// One-line hint shown under the label
    pub fn hint(self, mode: InputMode) -> &'static str {
        match (self, mode) {
            (Self::Keyword, _) => "Primary categorization for this entry",
            (Self::Tags, _) => "Comma-separated tags for secondary categorization",
            (Self::Duration, InputMode::DurationEnd) => {
                "Total time in HH:MM:SS format (calculates start time)"
            }
            (Self::Duration, _) => "Total time in HH:MM:SS format (calculates end time)",
            (Self::StartTime, _) => "When tracking started (YYYY-MM-DD HH:MM:SS)",
            (Self::EndTime, InputMode::StartEnd) => {
                "When tracking ended (calculates duration; empty keeps it running)"
            }
            (Self::EndTime, _) => "When tracking ended (YYYY-MM-DD HH:MM:SS)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: FieldName,
    pub value: String,
}

impl Field {
    pub fn new(name: FieldName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Look up a field's text, empty when the field is absent
pub fn text_of(fields: &[Field], name: FieldName) -> &str {
    fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.value.as_str())
        .unwrap_or("")
}

/// Initial text for `name` taken from the stored entry
pub fn seed_value(name: FieldName, mode: InputMode, entry: &Entry, now: DateTime<Local>) -> String {
    match name {
        FieldName::Keyword => entry.keyword.clone(),
        FieldName::Tags => entry.tags.join(", "),
        FieldName::Duration => format_hms(entry.current_duration(now)),
        FieldName::StartTime => format_timestamp(&entry.start_time),
        FieldName::EndTime => match (entry.end_time, mode) {
            (Some(end), _) => format_timestamp(&end),
            // Deriving the start needs an anchor; offer the current time
            (None, InputMode::DurationEnd) => format_timestamp(&now),
            (None, _) => String::new(),
        },
    }
}

/// Fields for `mode` filled from the stored entry
pub fn seed_fields(mode: InputMode, entry: &Entry, now: DateTime<Local>) -> Vec<Field> {
    mode.field_names()
        .into_iter()
        .map(|name| Field::new(name, seed_value(name, mode, entry, now)))
        .collect()
}

/// Value of `name` implied by a parsed span, if the span pins it down
fn derived_text(name: FieldName, span: &TimeSpan) -> Option<String> {
    match (name, span) {
        (FieldName::StartTime, span) => Some(format_timestamp(&span.start())),
        (FieldName::EndTime, TimeSpan::Completed { end, .. }) => Some(format_timestamp(end)),
        (FieldName::Duration, TimeSpan::Completed { duration, .. }) => Some(format_hms(*duration)),
        _ => None,
    }
}

/// Whether two texts denote the same duration or instant
fn same_value(name: FieldName, a: &str, b: &str) -> bool {
    match name.kind() {
        FieldKind::Duration => matches!((parse_hms(a), parse_hms(b)), (Ok(x), Ok(y)) if x == y),
        FieldKind::Timestamp => {
            matches!((parse_timestamp(a), parse_timestamp(b)), (Ok(x), Ok(y)) if x == y)
        }
        FieldKind::Text | FieldKind::Tags => a == b,
    }
}

/// Rebuild the field list for a mode switch.
///
/// Fields present in both modes keep their text verbatim. A field new to
/// `to` is computed from the `from` values when they parse and derive; a
/// remembered text that denotes the same value is preferred over the
/// recomputed one. Without a derivation the remembered text is used, and
/// failing that the stored entry.
pub fn carry_forward(
    from: InputMode,
    fields: &[Field],
    to: InputMode,
    remembered: &HashMap<FieldName, String>,
    entry: &Entry,
    now: DateTime<Local>,
) -> Vec<Field> {
    let span = ModeInput::parse(from, |name| text_of(fields, name))
        .and_then(ModeInput::derive)
        .ok();

    to.field_names()
        .into_iter()
        .map(|name| {
            if from.has_field(name) {
                return Field::new(name, text_of(fields, name));
            }

            let derived = span.as_ref().and_then(|s| derived_text(name, s));
            let value = match (derived, remembered.get(&name)) {
                (Some(d), Some(r)) if same_value(name, r, &d) => r.clone(),
                (Some(d), _) => d,
                (None, Some(r)) => r.clone(),
                (None, None) => seed_value(name, to, entry, now),
            };
            Field::new(name, value)
        })
        .collect()
}
