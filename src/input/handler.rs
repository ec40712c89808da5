use super::Flow;
use crate::domain::{validate_keyword, Entry};
use crate::editor::{FieldEditor, InputMode};
use crate::ui::confirm::ConfirmState;
use crate::ui::selector::SelectorState;
use crate::ui::start_input::StartInputState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Drive the entry editor; `Done` means `entry` now holds the committed values
pub fn handle_field_editor_key(editor: &mut FieldEditor, entry: &mut Entry, key: KeyEvent) -> Flow<()> {
    if is_interrupt(&key) {
        return Flow::Cancelled;
    }

    match key.code {
        KeyCode::Esc => Flow::Cancelled,
        KeyCode::Enter => match editor.submit(entry) {
            Ok(()) => Flow::Done(()),
            Err(_) => Flow::Continue,
        },
        KeyCode::Tab | KeyCode::Down => {
            editor.focus_next();
            Flow::Continue
        }
        KeyCode::Up => {
            editor.focus_prev();
            Flow::Continue
        }
        KeyCode::BackTab => {
            editor.cycle_mode();
            Flow::Continue
        }
        KeyCode::F(n) => {
            if let Some(mode) = InputMode::from_hotkey(n) {
                editor.switch_mode(mode);
            }
            Flow::Continue
        }
        KeyCode::Backspace => {
            editor.backspace();
            Flow::Continue
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.clear_focused();
            Flow::Continue
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            editor.insert_char(c);
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

/// Yes/No prompt; Esc and Ctrl+C count as cancel, not as No
pub fn handle_confirm_key(state: &mut ConfirmState, key: KeyEvent) -> Flow<bool> {
    if is_interrupt(&key) {
        return Flow::Cancelled;
    }

    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Flow::Done(true),
        KeyCode::Char('n') | KeyCode::Char('N') => Flow::Done(false),
        KeyCode::Left => {
            state.yes = true;
            Flow::Continue
        }
        KeyCode::Right => {
            state.yes = false;
            Flow::Continue
        }
        KeyCode::Tab => {
            state.yes = !state.yes;
            Flow::Continue
        }
        KeyCode::Enter => Flow::Done(state.yes),
        KeyCode::Esc => Flow::Cancelled,
        _ => Flow::Continue,
    }
}

fn handle_search_key(state: &mut SelectorState, key: KeyEvent) -> Flow<Vec<String>> {
    match key.code {
        KeyCode::Esc => state.leave_search(),
        KeyCode::Tab | KeyCode::Enter | KeyCode::Down => state.search_focused = false,
        KeyCode::Backspace => {
            state.query.pop();
            state.apply_query();
        }
        KeyCode::Char(c) => {
            state.query.push(c);
            state.apply_query();
        }
        _ => {}
    }
    Flow::Continue
}

/// Table picker; `Done` carries the chosen ids
pub fn handle_selector_key(state: &mut SelectorState, key: KeyEvent) -> Flow<Vec<String>> {
    if is_interrupt(&key) {
        return Flow::Cancelled;
    }
    if state.search_mode && state.search_focused {
        return handle_search_key(state, key);
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(),
        KeyCode::Char(' ') if state.multi => state.toggle_current(),
        KeyCode::Char('f') | KeyCode::Char('/') => state.enter_search(),
        KeyCode::Tab if state.search_mode => state.search_focused = true,
        KeyCode::Char('?') => state.show_help = !state.show_help,
        KeyCode::Enter => {
            let chosen = state.chosen();
            if chosen.is_empty() {
                return Flow::Continue;
            }
            debug!(count = chosen.len(), "selector confirmed");
            return Flow::Done(chosen);
        }
        KeyCode::Esc if state.search_mode => state.leave_search(),
        KeyCode::Esc | KeyCode::Char('q') => return Flow::Cancelled,
        _ => {}
    }
    Flow::Continue
}

/// Keyword/tags prompt; Enter on the keyword moves on, Enter on tags submits
pub fn handle_start_input_key(state: &mut StartInputState, key: KeyEvent) -> Flow<(String, Vec<String>)> {
    if is_interrupt(&key) {
        return Flow::Cancelled;
    }

    match key.code {
        KeyCode::Esc => Flow::Cancelled,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            state.toggle_field();
            Flow::Continue
        }
        KeyCode::Enter if state.editing_field == 0 => {
            state.editing_field = 1;
            Flow::Continue
        }
        KeyCode::Enter => match validate_keyword(&state.keyword) {
            Ok(keyword) => Flow::Done((keyword, state.parsed_tags())),
            Err(err) => {
                state.error = Some(err.to_string());
                state.editing_field = 0;
                Flow::Continue
            }
        },
        KeyCode::Backspace => {
            state.focused_text().pop();
            Flow::Continue
        }
        KeyCode::Char(c) => {
            state.error = None;
            state.focused_text().push(c);
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}
