use thiserror::Error;

/// Highest short id handed out; integers up to here are never keywords
pub const MAX_SHORT_ID: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeywordError {
    #[error("keyword cannot be empty")]
    Empty,
    #[error("keyword cannot be a number")]
    Reserved,
}

/// How a command-line argument refers to entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    ShortId(u32),
    Keyword(String),
}

fn as_short_id(text: &str) -> Option<u32> {
    text.parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_SHORT_ID).contains(n))
}

/// Trim and validate a keyword
pub fn validate_keyword(raw: &str) -> Result<String, KeywordError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err(KeywordError::Empty);
    }
    if as_short_id(keyword).is_some() {
        return Err(KeywordError::Reserved);
    }
    Ok(keyword.to_string())
}

/// Split comma-separated tags, trimming and dropping empties
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_target(arg: &str) -> Target {
    let arg = arg.trim();
    match as_short_id(arg) {
        Some(id) => Target::ShortId(id),
        None => Target::Keyword(arg.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_keyword() {
        assert_eq!(validate_keyword("  coding ").unwrap(), "coding");
        assert_eq!(validate_keyword("   "), Err(KeywordError::Empty));
        assert_eq!(validate_keyword("500"), Err(KeywordError::Reserved));
        assert_eq!(validate_keyword("1000"), Err(KeywordError::Reserved));
        assert_eq!(validate_keyword("1001").unwrap(), "1001");
        assert_eq!(validate_keyword("0").unwrap(), "0");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(KeywordError::Empty.to_string(), "keyword cannot be empty");
        assert_eq!(KeywordError::Reserved.to_string(), "keyword cannot be a number");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags(" a, b ,,c ,"), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("7"), Target::ShortId(7));
        assert_eq!(parse_target("1001"), Target::Keyword("1001".into()));
        assert_eq!(parse_target("coding"), Target::Keyword("coding".into()));
    }
}
