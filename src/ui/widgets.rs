//! Interactive wrappers binding each widget's state, renderer and key handler.

use super::confirm::{render_confirm, ConfirmState};
use super::field_editor::render_field_editor;
use super::selector::{render_selector, SelectorState};
use super::start_input::{render_start_input, StartInputState};
use super::terminal::{run_interactive, Interactive};
use crate::domain::Entry;
use crate::editor::FieldEditor;
use crate::input::{
    handle_confirm_key, handle_field_editor_key, handle_selector_key, handle_start_input_key, Flow,
};
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::KeyEvent;
use ratatui::Frame;

impl Interactive for ConfirmState {
    type Output = bool;

    fn draw(&self, f: &mut Frame) {
        let area = f.size();
        render_confirm(f, self, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow<bool> {
        handle_confirm_key(self, key)
    }
}

impl Interactive for SelectorState {
    type Output = Vec<String>;

    fn draw(&self, f: &mut Frame) {
        let area = f.size();
        render_selector(f, self, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow<Vec<String>> {
        handle_selector_key(self, key)
    }
}

impl Interactive for StartInputState {
    type Output = (String, Vec<String>);

    fn draw(&self, f: &mut Frame) {
        let area = f.size();
        render_start_input(f, self, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow<Self::Output> {
        handle_start_input_key(self, key)
    }
}

/// Editor session over a working copy of an entry
struct EntryEditing {
    editor: FieldEditor,
    draft: Entry,
}

impl Interactive for EntryEditing {
    type Output = ();

    fn draw(&self, f: &mut Frame) {
        let area = f.size();
        render_field_editor(f, &self.editor, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow<()> {
        handle_field_editor_key(&mut self.editor, &mut self.draft, key)
    }
}

/// Ask a yes/no question; cancelling answers no
pub fn confirm(message: impl Into<String>) -> Result<bool> {
    let mut state = ConfirmState::new(message);
    Ok(run_interactive(&mut state)?.unwrap_or(false))
}

/// Let the user pick rows; `None` when cancelled
pub fn select(mut state: SelectorState) -> Result<Option<Vec<String>>> {
    run_interactive(&mut state)
}

/// Ask for the keyword and tags of a new timer
pub fn prompt_start() -> Result<Option<(String, Vec<String>)>> {
    let mut state = StartInputState::default();
    run_interactive(&mut state)
}

/// Edit `entry` in the field editor; returns the committed copy, or `None` on Esc
pub fn edit_entry(entry: &Entry, now: DateTime<Local>) -> Result<Option<Entry>> {
    let mut session = EntryEditing {
        editor: FieldEditor::new(entry, now),
        draft: entry.clone(),
    };
    Ok(run_interactive(&mut session)?.map(|()| session.draft))
}
