use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("end time must be after start time")]
    EndNotAfterStart,
}

/// A tracked span of time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    /// 1..=1000 for the most recent entries, 0 otherwise
    #[serde(default)]
    pub short_id: u32,
    pub keyword: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub start_time: DateTime<Local>,
    #[serde(default)]
    pub end_time: Option<DateTime<Local>>,
    /// Whole seconds; 0 while active
    #[serde(default)]
    pub duration: i64,
    pub active: bool,
    /// Stopped and parked by `gt stash`, waiting to be popped
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stashed: bool,
}

/// Whole seconds in `d`, rounded half away from zero
pub fn round_seconds(d: Duration) -> i64 {
    let millis = d.num_milliseconds();
    if millis >= 0 {
        (millis + 500) / 1000
    } else {
        (millis - 500) / 1000
    }
}

/// Resolved start/end/duration triple ready to be written into an [`Entry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpan {
    Completed {
        start: DateTime<Local>,
        end: DateTime<Local>,
        duration: i64,
    },
    Active {
        start: DateTime<Local>,
    },
}

impl TimeSpan {
    pub fn start(&self) -> DateTime<Local> {
        match self {
            Self::Completed { start, .. } | Self::Active { start } => *start,
        }
    }
}

impl Entry {
    /// Create a running entry
    pub fn start_new(keyword: String, tags: Vec<String>, start: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_id: 0,
            keyword,
            tags,
            start_time: start,
            end_time: None,
            duration: 0,
            active: true,
            stashed: false,
        }
    }

    /// Create a completed entry; `end` must be after `start`
    pub fn completed(
        keyword: String,
        tags: Vec<String>,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Self, SpanError> {
        let mut entry = Self::start_new(keyword, tags, start);
        entry.stop(end)?;
        Ok(entry)
    }

    /// Close the entry at `end`; an end at or before the start leaves it untouched
    pub fn stop(&mut self, end: DateTime<Local>) -> Result<(), SpanError> {
        if end <= self.start_time {
            return Err(SpanError::EndNotAfterStart);
        }
        self.end_time = Some(end);
        self.duration = round_seconds(end - self.start_time);
        self.active = false;
        Ok(())
    }

    /// Elapsed seconds, counting up to `now` while active
    pub fn current_duration(&self, now: DateTime<Local>) -> i64 {
        if self.active {
            (now - self.start_time).num_seconds().max(0)
        } else {
            self.duration
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.has_tag(t))
    }

    /// Overwrite all editable state at once
    pub fn apply(&mut self, keyword: String, tags: Vec<String>, span: TimeSpan) {
        self.keyword = keyword;
        self.tags = tags;
        match span {
            TimeSpan::Completed {
                start,
                end,
                duration,
            } => {
                self.start_time = start;
                self.end_time = Some(end);
                self.duration = duration;
                self.active = false;
            }
            TimeSpan::Active { start } => {
                self.start_time = start;
                self.end_time = None;
                self.duration = 0;
                self.active = true;
            }
        }
    }

    /// The stored triple, as a span
    pub fn span(&self) -> TimeSpan {
        match self.end_time {
            Some(end) if !self.active => TimeSpan::Completed {
                start: self.start_time,
                end,
                duration: self.duration,
            },
            _ => TimeSpan::Active {
                start: self.start_time,
            },
        }
    }
}
