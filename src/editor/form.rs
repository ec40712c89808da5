use super::error::EditError;
use super::fields::{carry_forward, seed_fields, text_of, Field, FieldName};
use super::mode::{InputMode, ModeInput};
use crate::domain::{parse_tags, validate_keyword, Entry, TimeSpan};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use tracing::{debug, info};

/// Validated result of a submission, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub keyword: String,
    pub tags: Vec<String>,
    pub span: TimeSpan,
}

/// Editing session over one entry
#[derive(Debug, Clone)]
pub struct FieldEditor {
    mode: InputMode,
    fields: Vec<Field>,
    focused: usize,
    /// Last text seen in each field this session, kept across mode switches
    remembered: HashMap<FieldName, String>,
    /// Texts each mode was left with, valid while no switch follows an edit
    left_with: HashMap<InputMode, Vec<Field>>,
    /// Texts the current mode was entered with
    entered_with: Vec<Field>,
    error: Option<EditError>,
    original: Entry,
    now: DateTime<Local>,
}

impl FieldEditor {
    /// Open on the mode that suits the entry's state
    pub fn new(entry: &Entry, now: DateTime<Local>) -> Self {
        Self::with_mode(entry, InputMode::initial_for(entry), now)
    }

    pub fn with_mode(entry: &Entry, mode: InputMode, now: DateTime<Local>) -> Self {
        let fields = seed_fields(mode, entry, now);
        Self {
            mode,
            entered_with: fields.clone(),
            fields,
            focused: 0,
            remembered: HashMap::new(),
            left_with: HashMap::new(),
            error: None,
            original: entry.clone(),
            now,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn focused_name(&self) -> FieldName {
        self.fields[self.focused].name
    }

    pub fn error(&self) -> Option<&EditError> {
        self.error.as_ref()
    }

    /// The entry as it was when the session opened
    pub fn original(&self) -> &Entry {
        &self.original
    }

    pub fn value(&self, name: FieldName) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Replace a visible field's text; returns false if the mode lacks it
    pub fn set_value(&mut self, name: FieldName, text: &str) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.fields[self.focused].value.push(c);
    }

    pub fn backspace(&mut self) {
        self.fields[self.focused].value.pop();
    }

    pub fn clear_focused(&mut self) {
        self.fields[self.focused].value.clear();
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }

    /// Move to `target`, carrying typed text forward.
    ///
    /// When nothing was edited since `target` was last left, its texts come
    /// back verbatim. Selecting the current mode only clears the error.
    pub fn switch_mode(&mut self, target: InputMode) {
        self.error = None;
        if target == self.mode {
            return;
        }

        if self.fields != self.entered_with {
            self.left_with.clear();
        }
        self.left_with.insert(self.mode, self.fields.clone());
        for field in &self.fields {
            self.remembered.insert(field.name, field.value.clone());
        }
        let fields = match self.left_with.get(&target) {
            Some(texts) => texts.clone(),
            None => carry_forward(
                self.mode,
                &self.fields,
                target,
                &self.remembered,
                &self.original,
                self.now,
            ),
        };
        debug!(from = ?self.mode, to = ?target, "switched editor mode");

        self.mode = target;
        self.entered_with = fields.clone();
        self.fields = fields;
        self.focused = self
            .fields
            .iter()
            .position(|f| f.name.is_time())
            .unwrap_or(0);
    }

    pub fn cycle_mode(&mut self) {
        self.switch_mode(self.mode.next());
    }

    /// Validate every field without touching anything
    pub fn validate(&self) -> Result<Submission, EditError> {
        let keyword = validate_keyword(text_of(&self.fields, FieldName::Keyword))?;
        let tags = parse_tags(text_of(&self.fields, FieldName::Tags));
        let span = ModeInput::parse(self.mode, |name| text_of(&self.fields, name))?.derive()?;
        Ok(Submission {
            keyword,
            tags,
            span,
        })
    }

    /// Validate and write into `entry`; on failure `entry` is left as it was
    pub fn submit(&mut self, entry: &mut Entry) -> Result<(), EditError> {
        self.error = None;
        match self.validate() {
            Ok(submission) => {
                entry.apply(submission.keyword, submission.tags, submission.span);
                info!(short_id = entry.short_id, keyword = %entry.keyword, "entry updated");
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, mode = ?self.mode, "submission rejected");
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{format_timestamp, parse_timestamp, KeywordError};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn at(text: &str) -> DateTime<Local> {
        parse_timestamp(text).unwrap()
    }

    fn running_entry() -> Entry {
        Entry::start_new("coding".into(), vec!["rust".into()], at("2025-08-08 10:00:00"))
    }

    fn finished_entry() -> Entry {
        let start = at("2025-08-08 10:00:00");
        Entry::completed("coding".into(), vec!["rust".into()], start, start + Duration::hours(1)).unwrap()
    }

    fn texts(editor: &FieldEditor) -> Vec<String> {
        editor.fields().iter().map(|f| f.value.clone()).collect()
    }

    #[test]
    fn test_duration_start_commit() {
        let mut entry = running_entry();
        let mut editor =
            FieldEditor::with_mode(&entry, InputMode::DurationStart, at("2025-08-08 10:30:00"));
        editor.set_value(FieldName::StartTime, "2025-08-08 10:00:00");
        editor.set_value(FieldName::Duration, "02:00:00");

        editor.submit(&mut entry).unwrap();
        assert_eq!(entry.end_time.map(|e| format_timestamp(&e)).as_deref(), Some("2025-08-08 12:00:00"));
        assert_eq!(entry.duration, 7200);
        assert!(!entry.active);
    }

    #[test]
    fn test_start_end_with_empty_end_keeps_running() {
        let mut entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        assert_eq!(editor.mode(), InputMode::StartEnd);
        editor.set_value(FieldName::EndTime, "");

        editor.submit(&mut entry).unwrap();
        assert!(entry.active);
        assert_eq!(entry.end_time, None);
        assert_eq!(entry.duration, 0);
        assert_eq!(format_timestamp(&entry.start_time), "2025-08-08 10:00:00");
    }

    #[test]
    fn test_failed_commit_leaves_entry_untouched() {
        let mut entry = finished_entry();
        let before = entry.clone();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        editor.set_value(FieldName::Keyword, "renamed");
        editor.set_value(FieldName::Tags, "new, tags");
        editor.set_value(FieldName::EndTime, "2025-08-08 09:00:00");

        let err = editor.submit(&mut entry).unwrap_err();
        assert_eq!(err, EditError::EndNotAfterStart);
        assert_eq!(entry, before);
        assert_eq!(editor.value(FieldName::Keyword), Some("renamed"));
        assert_eq!(editor.error(), Some(&EditError::EndNotAfterStart));
    }

    #[test]
    fn test_reserved_keyword_rejected() {
        let mut entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        editor.set_value(FieldName::Keyword, "500");

        let err = editor.submit(&mut entry).unwrap_err();
        assert_eq!(err, EditError::Keyword(KeywordError::Reserved));
        assert_eq!(err.to_string(), "keyword cannot be a number");
        assert_eq!(entry.keyword, "coding");
    }

    #[test]
    fn test_retry_after_error_clears_it() {
        let mut entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        editor.set_value(FieldName::EndTime, "2025-08-08 09:00:00");
        assert!(editor.submit(&mut entry).is_err());

        editor.set_value(FieldName::EndTime, "2025-08-08 11:30:00");
        editor.submit(&mut entry).unwrap();
        assert_eq!(editor.error(), None);
        assert_eq!(entry.duration, 5400);
    }

    #[test]
    fn test_round_trip_through_every_mode_keeps_text() {
        let entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        editor.set_value(FieldName::StartTime, "2025-08-08 09:15:00");
        let original = texts(&editor);

        editor.switch_mode(InputMode::DurationStart);
        assert_eq!(editor.value(FieldName::Duration), Some("01:45:00"));
        editor.switch_mode(InputMode::StartEnd);
        assert_eq!(texts(&editor), original);

        editor.cycle_mode();
        editor.cycle_mode();
        editor.cycle_mode();
        assert_eq!(editor.mode(), InputMode::StartEnd);
        assert_eq!(texts(&editor), original);
    }

    #[test]
    fn test_round_trip_keeps_cleared_end() {
        let mut entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        editor.set_value(FieldName::EndTime, "");
        let original = texts(&editor);

        editor.switch_mode(InputMode::DurationStart);
        editor.switch_mode(InputMode::StartEnd);
        assert_eq!(texts(&editor), original);

        editor.cycle_mode();
        editor.cycle_mode();
        editor.cycle_mode();
        assert_eq!(texts(&editor), original);

        editor.submit(&mut entry).unwrap();
        assert!(entry.active);
        assert_eq!(entry.end_time, None);
    }

    #[test]
    fn test_edit_after_switch_recomputes_on_return() {
        let entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));

        editor.switch_mode(InputMode::DurationStart);
        editor.set_value(FieldName::Duration, "00:30:00");
        editor.switch_mode(InputMode::StartEnd);
        assert_eq!(editor.value(FieldName::EndTime), Some("2025-08-08 10:30:00"));

        editor.switch_mode(InputMode::DurationStart);
        assert_eq!(editor.value(FieldName::Duration), Some("00:30:00"));
    }

    #[test]
    fn test_round_trip_keeps_unparsable_text() {
        let entry = running_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 10:30:00"));
        editor.set_value(FieldName::Duration, "banana");
        let original = texts(&editor);

        editor.switch_mode(InputMode::DurationEnd);
        editor.switch_mode(InputMode::DurationStart);
        assert_eq!(texts(&editor), original);
    }

    #[test]
    fn test_switch_focuses_first_time_field() {
        let entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        assert_eq!(editor.focused(), 0);

        editor.switch_mode(InputMode::DurationEnd);
        assert_eq!(editor.focused_name(), FieldName::Duration);
    }

    #[test]
    fn test_same_mode_only_clears_error() {
        let mut entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        editor.set_value(FieldName::Keyword, " ");
        assert!(editor.submit(&mut entry).is_err());
        let before = texts(&editor);

        editor.switch_mode(InputMode::StartEnd);
        assert_eq!(editor.error(), None);
        assert_eq!(texts(&editor), before);
        assert_eq!(editor.focused(), 0);
    }

    #[test]
    fn test_duration_end_derives_start() {
        let mut entry = finished_entry();
        let mut editor = FieldEditor::with_mode(&entry, InputMode::DurationEnd, at("2025-08-08 12:00:00"));
        assert_eq!(editor.value(FieldName::EndTime), Some("2025-08-08 11:00:00"));
        editor.set_value(FieldName::Duration, "00:20:00");

        editor.submit(&mut entry).unwrap();
        assert_eq!(format_timestamp(&entry.start_time), "2025-08-08 10:40:00");
        assert_eq!(entry.duration, 1200);
    }

    #[test]
    fn test_duration_end_empty_end_is_an_error() {
        let mut entry = running_entry();
        let mut editor = FieldEditor::with_mode(&entry, InputMode::DurationEnd, at("2025-08-08 12:00:00"));
        editor.set_value(FieldName::EndTime, "  ");

        assert_eq!(editor.submit(&mut entry), Err(EditError::MissingEnd));
        assert!(entry.active);
    }

    #[test]
    fn test_typing_and_focus() {
        let entry = finished_entry();
        let mut editor = FieldEditor::new(&entry, at("2025-08-08 12:00:00"));
        editor.clear_focused();
        for c in "deep work".chars() {
            editor.insert_char(c);
        }
        editor.backspace();
        assert_eq!(editor.value(FieldName::Keyword), Some("deep wor"));

        editor.focus_prev();
        assert_eq!(editor.focused_name(), FieldName::EndTime);
        editor.focus_next();
        assert_eq!(editor.focused_name(), FieldName::Keyword);
    }
}
