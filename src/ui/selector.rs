use crate::ui::styles::{
    border_style, hint_style, modal_title_style, selected_style, header_style, title_style,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};
use std::collections::HashSet;

/// One row offered by the selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorItem {
    pub id: String,
    pub columns: Vec<String>,
}

impl SelectorItem {
    pub fn new(id: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            id: id.into(),
            columns,
        }
    }

    /// Lowercased text the search terms are matched against
    fn haystack(&self) -> String {
        self.columns.join(" ").to_lowercase()
    }
}

/// Table picker with optional multi-select and incremental search
#[derive(Debug, Clone)]
pub struct SelectorState {
    pub title: String,
    pub headers: Vec<String>,
    pub items: Vec<SelectorItem>,
    /// Indices into `items` that pass the current query
    pub visible: Vec<usize>,
    pub cursor: usize,
    pub multi: bool,
    pub checked: HashSet<String>,
    pub search_mode: bool,
    pub search_focused: bool,
    pub query: String,
    pub show_help: bool,
}

impl SelectorState {
    pub fn single(title: impl Into<String>, headers: Vec<String>, items: Vec<SelectorItem>) -> Self {
        let visible = (0..items.len()).collect();
        Self {
            title: title.into(),
            headers,
            items,
            visible,
            cursor: 0,
            multi: false,
            checked: HashSet::new(),
            search_mode: false,
            search_focused: false,
            query: String::new(),
            show_help: false,
        }
    }

    pub fn multi(title: impl Into<String>, headers: Vec<String>, items: Vec<SelectorItem>) -> Self {
        Self {
            multi: true,
            ..Self::single(title, headers, items)
        }
    }

    /// Keep items whose joined columns contain every whitespace-separated term
    pub fn apply_query(&mut self) {
        let terms: Vec<String> = self
            .query
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                let haystack = item.haystack();
                terms.iter().all(|t| haystack.contains(t.as_str()))
            })
            .map(|(i, _)| i)
            .collect();
        self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
    }

    pub fn current(&self) -> Option<&SelectorItem> {
        self.visible.get(self.cursor).map(|i| &self.items[*i])
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.visible.len() {
            self.cursor += 1;
        }
    }

    pub fn toggle_current(&mut self) {
        if let Some(id) = self.current().map(|item| item.id.clone()) {
            if !self.checked.remove(&id) {
                self.checked.insert(id);
            }
        }
    }

    pub fn enter_search(&mut self) {
        self.search_mode = true;
        self.search_focused = true;
    }

    pub fn leave_search(&mut self) {
        self.search_mode = false;
        self.search_focused = false;
        self.query.clear();
        self.apply_query();
    }

    /// Ids to return on Enter: the checked rows in list order, else the row under the cursor
    pub fn chosen(&self) -> Vec<String> {
        if self.multi && !self.checked.is_empty() {
            return self
                .items
                .iter()
                .filter(|item| self.checked.contains(&item.id))
                .map(|item| item.id.clone())
                .collect();
        }
        self.current().map(|item| vec![item.id.clone()]).unwrap_or_default()
    }
}

/// Render the selector full screen
pub fn render_selector(f: &mut Frame, state: &SelectorState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if state.search_mode { 3 } else { 0 }),
            Constraint::Min(3),
            Constraint::Length(if state.show_help { 4 } else { 1 }),
        ])
        .split(area);

    if state.search_mode {
        let cursor = if state.search_focused { "█" } else { "" };
        let search = Paragraph::new(Line::from(vec![
            Span::raw("/ "),
            Span::styled(state.query.as_str(), modal_title_style()),
            Span::styled(cursor, modal_title_style()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(" Search ", title_style())),
        );
        f.render_widget(search, chunks[0]);
    }

    let offset = usize::from(state.multi);
    let mut header_cells: Vec<String> = Vec::new();
    if state.multi {
        header_cells.push(String::new());
    }
    header_cells.extend(state.headers.iter().cloned());

    let rows: Vec<Row> = state
        .visible
        .iter()
        .map(|i| {
            let item = &state.items[*i];
            let mut cells: Vec<String> = Vec::with_capacity(item.columns.len() + offset);
            if state.multi {
                let mark = if state.checked.contains(&item.id) { "[x]" } else { "[ ]" };
                cells.push(mark.to_string());
            }
            cells.extend(item.columns.iter().cloned());
            Row::new(cells)
        })
        .collect();

    let column_count = header_cells.len().max(1);
    let widths: Vec<Constraint> = (0..column_count)
        .map(|i| {
            if state.multi && i == 0 {
                Constraint::Length(3)
            } else {
                Constraint::Percentage((100 / column_count) as u16)
            }
        })
        .collect();

    let title = format!(" {} ({}/{}) ", state.title, state.visible.len(), state.items.len());
    let table = Table::new(rows, widths)
        .header(Row::new(header_cells).style(header_style()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(title, title_style())),
        )
        .highlight_style(selected_style());

    let mut table_state = TableState::default();
    if !state.visible.is_empty() {
        table_state.select(Some(state.cursor));
    }
    f.render_stateful_widget(table, chunks[1], &mut table_state);

    let mut help = vec![Line::styled(
        if state.multi {
            "↑/↓ move · Space toggle · Enter confirm · f or / search · ? help · Esc cancel"
        } else {
            "↑/↓ move · Enter select · f or / search · ? help · Esc cancel"
        },
        hint_style(),
    )];
    if state.show_help {
        help.push(Line::styled(
            "Search: type terms (all must match) · Tab switches between query and table",
            hint_style(),
        ));
        help.push(Line::styled(
            "Esc in search clears the query · Enter in the query returns to the table",
            hint_style(),
        ));
    }
    f.render_widget(Paragraph::new(help), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state() -> SelectorState {
        SelectorState::multi(
            "Pick",
            vec!["ID".into(), "Keyword".into(), "Tags".into()],
            vec![
                SelectorItem::new("1", vec!["1".into(), "coding".into(), "rust cli".into()]),
                SelectorItem::new("2", vec!["2".into(), "meeting".into(), "work".into()]),
                SelectorItem::new("3", vec!["3".into(), "Coding".into(), "go".into()]),
            ],
        )
    }

    #[test]
    fn test_query_requires_every_term() {
        let mut s = state();
        s.query = "CODING  rust".into();
        s.apply_query();
        assert_eq!(s.visible, vec![0]);

        s.query = "coding".into();
        s.apply_query();
        assert_eq!(s.visible, vec![0, 2]);

        s.query = "nothing".into();
        s.apply_query();
        assert!(s.current().is_none());
        assert!(s.chosen().is_empty());
    }

    #[test]
    fn test_chosen_prefers_checked_rows() {
        let mut s = state();
        s.move_down();
        assert_eq!(s.chosen(), vec!["2"]);

        s.move_down();
        s.toggle_current();
        s.move_up();
        s.move_up();
        s.toggle_current();
        assert_eq!(s.chosen(), vec!["1", "3"]);

        s.toggle_current();
        assert_eq!(s.chosen(), vec!["3"]);
    }

    #[test]
    fn test_cursor_clamps_after_filter() {
        let mut s = state();
        s.move_down();
        s.move_down();
        s.move_down();
        assert_eq!(s.cursor, 2);

        s.query = "meeting".into();
        s.apply_query();
        assert_eq!(s.cursor, 0);
        assert_eq!(s.current().unwrap().id, "2");
    }
}
