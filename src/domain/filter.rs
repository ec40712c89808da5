use super::entry::Entry;
use super::timefmt::{parse_day_start, start_of_day, TimeFormatError};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate};

/// Which slice of the calendar an entry's start time must fall in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRange {
    All,
    Today,
    Yesterday,
    /// Sunday through Saturday containing today
    Week,
    Month,
    Year,
    /// The last `n` days up to now
    Days(u32),
    /// Half-open `[from, to)`; either side may be open
    Between {
        from: Option<DateTime<Local>>,
        to: Option<DateTime<Local>>,
    },
}

impl TimeRange {
    /// Parse `YYYY-MM-DD,YYYY-MM-DD`; the second day is included whole
    pub fn parse_between(text: &str) -> Result<Self, TimeFormatError> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != 2 {
            return Err(TimeFormatError::Date(text.to_string()));
        }
        Self::from_to(Some(parts[0]), Some(parts[1]))
    }

    /// Open-ended range from `--from` / `--to`; `to` is included whole
    pub fn from_to(from: Option<&str>, to: Option<&str>) -> Result<Self, TimeFormatError> {
        let from = from.map(parse_day_start).transpose()?;
        let to = to
            .map(|t| {
                parse_day_start(t)?
                    .checked_add_days(Days::new(1))
                    .ok_or(TimeFormatError::OutOfRange)
            })
            .transpose()?;
        Ok(Self::Between { from, to })
    }

    /// Concrete `[lower, upper)` bounds relative to `now`
    pub fn bounds(&self, now: DateTime<Local>) -> (Option<DateTime<Local>>, Option<DateTime<Local>>) {
        let today = now.date_naive();
        let day = |d: NaiveDate| start_of_day(d);
        match self {
            Self::All => (None, None),
            Self::Today => (day(today), today.succ_opt().and_then(day)),
            Self::Yesterday => (today.pred_opt().and_then(day), day(today)),
            Self::Week => {
                let since_sunday = today.weekday().num_days_from_sunday() as u64;
                let sunday = today.checked_sub_days(Days::new(since_sunday));
                (
                    sunday.and_then(day),
                    sunday.and_then(|d| d.checked_add_days(Days::new(7))).and_then(day),
                )
            }
            Self::Month => {
                let first = today.with_day(1).unwrap_or(today);
                let next = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
                };
                (day(first), next.and_then(day))
            }
            Self::Year => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).and_then(day),
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).and_then(day),
            ),
            // Reaching past the calendar's start leaves the range open
            Self::Days(n) => (now.checked_sub_days(Days::new(u64::from(*n))), None),
            Self::Between { from, to } => (*from, *to),
        }
    }

    pub fn contains(&self, t: DateTime<Local>, now: DateTime<Local>) -> bool {
        let (lower, upper) = self.bounds(now);
        lower.map_or(true, |l| t >= l) && upper.map_or(true, |u| t < u)
    }
}

/// Include or exclude entries by a set of values
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Any,
    Only(Vec<String>),
    Except(Vec<String>),
}

impl Selection {
    fn admits(&self, hit: impl Fn(&[String]) -> bool) -> bool {
        match self {
            Self::Any => true,
            Self::Only(values) => hit(values),
            Self::Except(values) => !hit(values),
        }
    }
}

/// Criteria for `list` and `report`
#[derive(Debug, Clone)]
pub struct EntryFilter {
    pub range: TimeRange,
    /// `Some(true)` keeps only running entries, `Some(false)` only stopped ones
    pub active: Option<bool>,
    pub keywords: Selection,
    pub tags: Selection,
    pub min_duration: i64,
    /// 0 means unbounded
    pub max_duration: i64,
    /// Stashed entries are left out unless set
    pub include_stashed: bool,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            range: TimeRange::All,
            active: None,
            keywords: Selection::Any,
            tags: Selection::Any,
            min_duration: 0,
            max_duration: 0,
            include_stashed: false,
        }
    }
}

impl EntryFilter {
    pub fn matches(&self, entry: &Entry, now: DateTime<Local>) -> bool {
        if entry.stashed && !self.include_stashed {
            return false;
        }
        if let Some(active) = self.active {
            if entry.active != active {
                return false;
            }
        }
        if !self.keywords.admits(|ks| ks.iter().any(|k| *k == entry.keyword)) {
            return false;
        }
        if !self.tags.admits(|ts| entry.has_any_tag(ts)) {
            return false;
        }
        if !self.range.contains(entry.start_time, now) {
            return false;
        }

        let duration = entry.current_duration(now);
        if self.min_duration > 0 && duration < self.min_duration {
            return false;
        }
        if self.max_duration > 0 && duration > self.max_duration {
            return false;
        }
        true
    }

    /// Matching entries, oldest first
    pub fn apply<'a>(&self, entries: &'a [Entry], now: DateTime<Local>) -> Vec<&'a Entry> {
        let mut found: Vec<&Entry> = entries.iter().filter(|e| self.matches(e, now)).collect();
        found.sort_by_key(|e| e.start_time);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timefmt::parse_timestamp;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn at(text: &str) -> DateTime<Local> {
        parse_timestamp(text).unwrap()
    }

    fn entry(keyword: &str, tags: &[&str], start: &str, minutes: i64) -> Entry {
        let start = at(start);
        Entry::completed(
            keyword.into(),
            tags.iter().map(|t| t.to_string()).collect(),
            start,
            start + Duration::minutes(minutes),
        ).unwrap()
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2025-08-08 is a Friday
        let now = at("2025-08-08 12:00:00");
        let (lower, upper) = TimeRange::Week.bounds(now);
        assert_eq!(lower, Some(at("2025-08-03 00:00:00")));
        assert_eq!(upper, Some(at("2025-08-10 00:00:00")));
    }

    #[test]
    fn test_huge_day_count_is_unbounded() {
        let now = at("2025-08-08 12:00:00");
        assert_eq!(TimeRange::Days(u32::MAX).bounds(now), (None, None));
        assert!(TimeRange::Days(u32::MAX).contains(at("1970-01-01 00:00:00"), now));
        assert_eq!(
            TimeRange::Days(2).bounds(now),
            (Some(at("2025-08-06 12:00:00")), None)
        );
    }

    #[test]
    fn test_month_rolls_over_year() {
        let now = at("2025-12-15 12:00:00");
        let (lower, upper) = TimeRange::Month.bounds(now);
        assert_eq!(lower, Some(at("2025-12-01 00:00:00")));
        assert_eq!(upper, Some(at("2026-01-01 00:00:00")));
    }

    #[test]
    fn test_between_includes_last_day() {
        let range = TimeRange::parse_between("2025-08-01,2025-08-07").unwrap();
        let now = at("2025-09-01 00:00:00");
        assert!(range.contains(at("2025-08-07 23:59:59"), now));
        assert!(!range.contains(at("2025-08-08 00:00:00"), now));
        assert!(range.contains(at("2025-08-01 00:00:00"), now));
        assert!(TimeRange::parse_between("2025-08-01").is_err());
    }

    #[test]
    fn test_keyword_and_tag_selection() {
        let now = at("2025-08-08 20:00:00");
        let entries = vec![
            entry("coding", &["rust"], "2025-08-08 09:00:00", 60),
            entry("meeting", &["work"], "2025-08-08 11:00:00", 30),
            entry("coding", &["go"], "2025-08-08 13:00:00", 90),
        ];

        let filter = EntryFilter {
            keywords: Selection::Only(vec!["coding".into()]),
            tags: Selection::Except(vec!["go".into()]),
            ..EntryFilter::default()
        };
        let found = filter.apply(&entries, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tags, vec!["rust"]);
    }

    #[test]
    fn test_duration_bounds_and_activity() {
        let now = at("2025-08-08 20:00:00");
        let mut running = entry("live", &[], "2025-08-08 19:00:00", 1);
        running.apply(
            "live".into(),
            vec![],
            crate::domain::entry::TimeSpan::Active {
                start: at("2025-08-08 19:00:00"),
            },
        );
        let entries = vec![entry("short", &[], "2025-08-08 09:00:00", 10), running];

        let filter = EntryFilter {
            min_duration: 1800,
            ..EntryFilter::default()
        };
        let found = filter.apply(&entries, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keyword, "live");

        let stopped_only = EntryFilter {
            active: Some(false),
            ..EntryFilter::default()
        };
        assert_eq!(stopped_only.apply(&entries, now)[0].keyword, "short");
    }

    #[test]
    fn test_stashed_entries_only_on_request() {
        let now = at("2025-08-08 20:00:00");
        let mut parked = entry("parked", &[], "2025-08-08 09:00:00", 30);
        parked.stashed = true;
        let entries = vec![parked, entry("done", &[], "2025-08-08 10:00:00", 30)];

        let found = EntryFilter::default().apply(&entries, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keyword, "done");

        let everything = EntryFilter {
            include_stashed: true,
            ..EntryFilter::default()
        };
        assert_eq!(everything.apply(&entries, now).len(), 2);
    }
}
