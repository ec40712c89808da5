//! Input modes of the entry editor and the arithmetic behind each one.
//!
//! Every mode makes two of {start, end, duration} editable and derives the
//! third at commit time. Parsing and derivation are pure so they can be run
//! leniently while switching modes and strictly while committing.

use super::error::EditError;
use super::fields::FieldName;
use crate::domain::{parse_hms, parse_timestamp, Entry, TimeSpan};
use chrono::{DateTime, Duration, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// End is derived
    DurationStart,
    /// Duration is derived; an empty end keeps the entry running
    StartEnd,
    /// Start is derived
    DurationEnd,
}

impl InputMode {
    pub const ALL: [InputMode; 3] = [Self::DurationStart, Self::StartEnd, Self::DurationEnd];

    /// Shift+Tab order
    pub fn next(self) -> Self {
        match self {
            Self::DurationStart => Self::StartEnd,
            Self::StartEnd => Self::DurationEnd,
            Self::DurationEnd => Self::DurationStart,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DurationStart => "Duration + Start Time",
            Self::StartEnd => "Start Time + End Time",
            Self::DurationEnd => "Duration + End Time",
        }
    }

    /// Function key that selects this mode directly
    pub fn hotkey(self) -> u8 {
        match self {
            Self::DurationStart => 1,
            Self::StartEnd => 2,
            Self::DurationEnd => 3,
        }
    }

    pub fn from_hotkey(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.hotkey() == n)
    }

    /// Running entries open on their duration, finished ones on their two timestamps
    pub fn initial_for(entry: &Entry) -> Self {
        if entry.active || entry.end_time.is_none() {
            Self::DurationStart
        } else {
            Self::StartEnd
        }
    }

    /// Fields shown in this mode, in display order
    pub fn field_names(self) -> [FieldName; 4] {
        let (a, b) = match self {
            Self::DurationStart => (FieldName::Duration, FieldName::StartTime),
            Self::StartEnd => (FieldName::StartTime, FieldName::EndTime),
            Self::DurationEnd => (FieldName::Duration, FieldName::EndTime),
        };
        [FieldName::Keyword, FieldName::Tags, a, b]
    }

    pub fn has_field(self, name: FieldName) -> bool {
        self.field_names().contains(&name)
    }
}

/// Parsed time inputs for one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeInput {
    DurationStart {
        duration: i64,
        start: DateTime<Local>,
    },
    StartEnd {
        start: DateTime<Local>,
        end: Option<DateTime<Local>>,
    },
    DurationEnd {
        duration: i64,
        end: DateTime<Local>,
    },
}

impl ModeInput {
    /// Parse the time fields of `mode`, looking texts up through `text`
    pub fn parse<'a, F>(mode: InputMode, text: F) -> Result<Self, EditError>
    where
        F: Fn(FieldName) -> &'a str,
    {
        match mode {
            InputMode::DurationStart => {
                let duration = parse_duration_field(text(FieldName::Duration))?;
                let start =
                    parse_timestamp(text(FieldName::StartTime)).map_err(EditError::StartTime)?;
                Ok(Self::DurationStart { duration, start })
            }
            InputMode::StartEnd => {
                let start =
                    parse_timestamp(text(FieldName::StartTime)).map_err(EditError::StartTime)?;
                let end_text = text(FieldName::EndTime).trim();
                let end = if end_text.is_empty() {
                    None
                } else {
                    Some(parse_timestamp(end_text).map_err(EditError::EndTime)?)
                };
                Ok(Self::StartEnd { start, end })
            }
            InputMode::DurationEnd => {
                let duration = parse_duration_field(text(FieldName::Duration))?;
                let end_text = text(FieldName::EndTime).trim();
                if end_text.is_empty() {
                    return Err(EditError::MissingEnd);
                }
                let end = parse_timestamp(end_text).map_err(EditError::EndTime)?;
                Ok(Self::DurationEnd { duration, end })
            }
        }
    }

    /// Compute the missing third quantity
    pub fn derive(self) -> Result<TimeSpan, EditError> {
        match self {
            Self::DurationStart { duration, start } => derive_end(start, duration),
            Self::StartEnd { start, end: None } => Ok(TimeSpan::Active { start }),
            Self::StartEnd {
                start,
                end: Some(end),
            } => derive_duration(start, end),
            Self::DurationEnd { duration, end } => derive_start(duration, end),
        }
    }
}

fn parse_duration_field(text: &str) -> Result<i64, EditError> {
    let duration = parse_hms(text).map_err(EditError::Duration)?;
    if duration <= 0 {
        return Err(EditError::NonPositiveDuration);
    }
    Ok(duration)
}

fn seconds(duration: i64) -> Result<Duration, EditError> {
    Duration::try_seconds(duration).ok_or(EditError::OutOfRange)
}

pub fn derive_end(start: DateTime<Local>, duration: i64) -> Result<TimeSpan, EditError> {
    if duration <= 0 {
        return Err(EditError::NonPositiveDuration);
    }
    let end = start
        .checked_add_signed(seconds(duration)?)
        .ok_or(EditError::OutOfRange)?;
    Ok(TimeSpan::Completed {
        start,
        end,
        duration,
    })
}

pub fn derive_duration(start: DateTime<Local>, end: DateTime<Local>) -> Result<TimeSpan, EditError> {
    if end <= start {
        return Err(EditError::EndNotAfterStart);
    }
    Ok(TimeSpan::Completed {
        start,
        end,
        duration: (end - start).num_seconds(),
    })
}

pub fn derive_start(duration: i64, end: DateTime<Local>) -> Result<TimeSpan, EditError> {
    if duration <= 0 {
        return Err(EditError::NonPositiveDuration);
    }
    let start = end
        .checked_sub_signed(seconds(duration)?)
        .ok_or(EditError::OutOfRange)?;
    Ok(TimeSpan::Completed {
        start,
        end,
        duration,
    })
}
