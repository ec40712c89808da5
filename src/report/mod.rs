pub mod generator;
pub mod stats;

pub use generator::{range_name, render_json, render_text, report_title};
pub use stats::{summarize_keywords, KeywordStats, KeywordSummary};
