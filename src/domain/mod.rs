pub mod entry;
pub mod filter;
pub mod keyword;
pub mod ledger;
pub mod timefmt;

pub use entry::{round_seconds, Entry, SpanError, TimeSpan};
pub use filter::{EntryFilter, Selection, TimeRange};
pub use keyword::{parse_tags, parse_target, validate_keyword, KeywordError, Target, MAX_SHORT_ID};
pub use ledger::{Ledger, Stash, UndoOperation, UndoRecord, UNDO_LIMIT};
pub use timefmt::{
    checked_after, checked_before, checked_seconds, format_hms, format_readable, format_timestamp, parse_hms, parse_human_duration,
    parse_threshold, parse_timestamp, TimeFormatError, TIMESTAMP_FORMAT,
};
