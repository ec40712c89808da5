use crate::domain::{KeywordError, TimeFormatError};
use thiserror::Error;

/// Why a field-editor submission was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Keyword(#[from] KeywordError),
    #[error("invalid duration format (use HH:MM:SS): {0}")]
    Duration(TimeFormatError),
    #[error("duration must be positive")]
    NonPositiveDuration,
    #[error("invalid start time format (use YYYY-MM-DD HH:MM:SS): {0}")]
    StartTime(TimeFormatError),
    #[error("invalid end time format (use YYYY-MM-DD HH:MM:SS): {0}")]
    EndTime(TimeFormatError),
    #[error("end time must be after start time")]
    EndNotAfterStart,
    #[error("end time is required when deriving the start time")]
    MissingEnd,
    #[error("resulting time is out of range")]
    OutOfRange,
}
