use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Layout shared by every timestamp the user types or reads
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout for day arguments such as `--between 2025-08-01,2025-08-07`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeFormatError {
    #[error("duration must be in HH:MM:SS format")]
    DurationShape,
    #[error("invalid hours")]
    Hours,
    #[error("invalid minutes (0-59)")]
    Minutes,
    #[error("invalid seconds (0-59)")]
    Seconds,
    #[error("expected YYYY-MM-DD HH:MM:SS, got '{0}'")]
    Timestamp(String),
    #[error("{0} does not exist in the local time zone")]
    NonexistentLocal(String),
    #[error("expected YYYY-MM-DD, got '{0}'")]
    Date(String),
    #[error("duration cannot be empty")]
    EmptyDuration,
    #[error("duration cannot be zero")]
    ZeroDuration,
    #[error("invalid duration format: {0} (supported formats: 5, 5m, 1h, 1h30, 1h30m, 2h30m30s)")]
    HumanDuration(String),
    #[error("time is out of range")]
    OutOfRange,
}

/// Format a local timestamp as `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(t: &DateTime<Local>) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse `YYYY-MM-DD HH:MM:SS` in the local zone.
///
/// A wall-clock time repeated by a DST fold resolves to its earlier instant;
/// a time skipped by a DST gap is an error.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Local>, TimeFormatError> {
    let text = text.trim();
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map_err(|_| TimeFormatError::Timestamp(text.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| TimeFormatError::NonexistentLocal(text.to_string()))
}

/// Format whole seconds as `HH:MM:SS`; hours grow past two digits as needed
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Parse `HH:MM:SS` into whole seconds
pub fn parse_hms(text: &str) -> Result<i64, TimeFormatError> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(TimeFormatError::DurationShape);
    }

    let hours: i64 = parse_component(parts[0]).ok_or(TimeFormatError::Hours)?;
    let minutes: i64 = parse_component(parts[1])
        .filter(|m| *m < 60)
        .ok_or(TimeFormatError::Minutes)?;
    let seconds: i64 = parse_component(parts[2])
        .filter(|s| *s < 60)
        .ok_or(TimeFormatError::Seconds)?;

    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or(TimeFormatError::Hours)
}

fn parse_component(part: &str) -> Option<i64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Readable form used by listings, e.g. `2h 05m 09s`
pub fn format_readable(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{}h {:02}m {:02}s",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Parse shorthand like `5`, `5m`, `1h`, `1h30`, `1h30m` or `2h30m30s`.
///
/// A bare number means minutes. A unitless number directly after an hour
/// component also means minutes. Zero is rejected.
pub fn parse_human_duration(input: &str) -> Result<Duration, TimeFormatError> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if compact.is_empty() {
        return Err(TimeFormatError::EmptyDuration);
    }

    let seconds = if compact.chars().all(|c| c.is_ascii_digit()) {
        compact
            .parse::<i64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .ok_or_else(|| TimeFormatError::HumanDuration(compact.clone()))?
    } else {
        sum_unit_components(&compact, UnitlessAfterHours::Minutes)
            .ok_or_else(|| TimeFormatError::HumanDuration(compact.clone()))?
    };

    if seconds == 0 {
        return Err(TimeFormatError::ZeroDuration);
    }
    checked_seconds(seconds)
}

/// Whole seconds as a chrono duration, failing past chrono's limits
pub fn checked_seconds(seconds: i64) -> Result<Duration, TimeFormatError> {
    Duration::try_seconds(seconds).ok_or(TimeFormatError::OutOfRange)
}

/// `t - d`, failing instead of overflowing
pub fn checked_before(t: DateTime<Local>, d: Duration) -> Result<DateTime<Local>, TimeFormatError> {
    t.checked_sub_signed(d).ok_or(TimeFormatError::OutOfRange)
}

/// `t + d`, failing instead of overflowing
pub fn checked_after(t: DateTime<Local>, d: Duration) -> Result<DateTime<Local>, TimeFormatError> {
    t.checked_add_signed(d).ok_or(TimeFormatError::OutOfRange)
}

/// Parse a duration threshold: `1h`, `30m`, `1h30m`, `90s`, or bare seconds
pub fn parse_threshold(input: &str) -> Result<i64, TimeFormatError> {
    let compact: String = input.trim().to_lowercase();
    if compact.is_empty() {
        return Ok(0);
    }
    if compact.chars().all(|c| c.is_ascii_digit()) {
        return compact
            .parse()
            .map_err(|_| TimeFormatError::HumanDuration(compact.clone()));
    }
    sum_unit_components(&compact, UnitlessAfterHours::Reject)
        .ok_or(TimeFormatError::HumanDuration(compact))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum UnitlessAfterHours {
    Minutes,
    Reject,
}

/// Sum `<n>h<n>m<n>s` components; units must appear at most once and in order
fn sum_unit_components(text: &str, unitless: UnitlessAfterHours) -> Option<i64> {
    let mut total: i64 = 0;
    let mut rank = 0u8;
    let mut digits = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let (unit_rank, factor) = match c {
            'h' => (1, 3600),
            'm' => (2, 60),
            's' => (3, 1),
            _ => return None,
        };
        if digits.is_empty() || unit_rank <= rank {
            return None;
        }
        let value: i64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(factor)?)?;
        rank = unit_rank;
        digits.clear();
    }

    if !digits.is_empty() {
        if rank != 1 || unitless == UnitlessAfterHours::Reject {
            return None;
        }
        let minutes: i64 = digits.parse().ok()?;
        total = total.checked_add(minutes.checked_mul(60)?)?;
    }

    Some(total)
}

/// Parse `YYYY-MM-DD` as the start of that day in the local zone
pub fn parse_day_start(text: &str) -> Result<DateTime<Local>, TimeFormatError> {
    let text = text.trim();
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|_| TimeFormatError::Date(text.to_string()))?;
    start_of_day(date).ok_or_else(|| TimeFormatError::NonexistentLocal(text.to_string()))
}

/// First instant of `date` in the local zone
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hms_round_trip_values() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(7200), "02:00:00");
        assert_eq!(format_hms(3 * 3600 + 5 * 60 + 9), "03:05:09");
        assert_eq!(format_hms(120 * 3600), "120:00:00");
        assert_eq!(parse_hms("120:00:00").unwrap(), 120 * 3600);
        assert_eq!(parse_hms(" 01:30:00 ").unwrap(), 5400);
    }

    #[test]
    fn test_parse_hms_errors() {
        assert_eq!(parse_hms("1:30"), Err(TimeFormatError::DurationShape));
        assert_eq!(parse_hms("xx:00:00"), Err(TimeFormatError::Hours));
        assert_eq!(parse_hms("-1:00:00"), Err(TimeFormatError::Hours));
        assert_eq!(parse_hms("01:60:00"), Err(TimeFormatError::Minutes));
        assert_eq!(parse_hms("01:00:75"), Err(TimeFormatError::Seconds));
        assert_eq!(parse_hms("01::00"), Err(TimeFormatError::Minutes));
    }

    #[test]
    fn test_parse_timestamp() {
        let t = parse_timestamp("2025-08-08 10:00:00").unwrap();
        assert_eq!(t.hour(), 10);
        assert_eq!(format_timestamp(&t), "2025-08-08 10:00:00");

        assert!(matches!(
            parse_timestamp("2025-08-08T10:00"),
            Err(TimeFormatError::Timestamp(_))
        ));
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_parse_human_duration() {
        assert_eq!(parse_human_duration("5").unwrap(), Duration::minutes(5));
        assert_eq!(parse_human_duration("5m").unwrap(), Duration::minutes(5));
        assert_eq!(parse_human_duration("30s").unwrap(), Duration::seconds(30));
        assert_eq!(parse_human_duration("1h").unwrap(), Duration::hours(1));
        assert_eq!(parse_human_duration("1h30").unwrap(), Duration::minutes(90));
        assert_eq!(parse_human_duration("1h30m").unwrap(), Duration::minutes(90));
        assert_eq!(
            parse_human_duration("2h 30m 30s").unwrap(),
            Duration::seconds(2 * 3600 + 30 * 60 + 30)
        );
    }

    #[test]
    fn test_parse_human_duration_rejects() {
        assert_eq!(parse_human_duration(""), Err(TimeFormatError::EmptyDuration));
        assert_eq!(parse_human_duration("0"), Err(TimeFormatError::ZeroDuration));
        assert_eq!(parse_human_duration("0h0m"), Err(TimeFormatError::ZeroDuration));
        assert!(parse_human_duration("30m1h").is_err());
        assert!(parse_human_duration("5x").is_err());
        assert!(parse_human_duration("30m15").is_err());
    }

    #[test]
    fn test_huge_durations_are_errors() {
        assert_eq!(
            parse_human_duration("99999999999999999"),
            Err(TimeFormatError::OutOfRange)
        );
        assert!(parse_human_duration("99999999999999999999").is_err());
        assert_eq!(checked_seconds(i64::MAX), Err(TimeFormatError::OutOfRange));

        let t = parse_timestamp("2025-08-08 10:00:00").unwrap();
        let far = parse_human_duration("99999999999999").unwrap();
        assert_eq!(checked_before(t, far), Err(TimeFormatError::OutOfRange));
        assert_eq!(checked_after(t, far), Err(TimeFormatError::OutOfRange));
        assert_eq!(
            format_timestamp(&checked_before(t, Duration::hours(1)).unwrap()),
            "2025-08-08 09:00:00"
        );
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("3600").unwrap(), 3600);
        assert_eq!(parse_threshold("1h30m").unwrap(), 5400);
        assert_eq!(parse_threshold("45m").unwrap(), 2700);
        assert_eq!(parse_threshold("").unwrap(), 0);
        assert!(parse_threshold("1h30").is_err());
    }

    #[test]
    fn test_format_readable() {
        assert_eq!(format_readable(3 * 3600 + 65), "3h 01m 05s");
        assert_eq!(format_readable(-5), "0h 00m 00s");
    }

    #[test]
    fn test_parse_day_start() {
        let t = parse_day_start("2025-08-01").unwrap();
        assert_eq!(format_timestamp(&t), "2025-08-01 00:00:00");
        assert!(parse_day_start("08/01/2025").is_err());
    }
}
