use crate::ui::{
    layout::create_modal_area,
    styles::{error_style, hint_style, modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Keyword and tags typed when starting a timer with no arguments
#[derive(Debug, Clone, Default)]
pub struct StartInputState {
    pub keyword: String,
    pub tags: String,
    /// 0 = keyword, 1 = tags
    pub editing_field: usize,
    pub error: Option<String>,
}

impl StartInputState {
    pub fn focused_text(&mut self) -> &mut String {
        if self.editing_field == 0 {
            &mut self.keyword
        } else {
            &mut self.tags
        }
    }

    pub fn toggle_field(&mut self) {
        self.editing_field = 1 - self.editing_field.min(1);
    }

    /// Tags split on commas or whitespace
    pub fn parsed_tags(&self) -> Vec<String> {
        self.tags
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

fn input_line(text: &str, editing: bool) -> Line<'_> {
    Line::from(vec![
        Span::raw("> "),
        Span::styled(text, modal_title_style()),
        if editing {
            Span::styled("█", modal_title_style())
        } else {
            Span::raw("")
        },
    ])
}

/// Render the start prompt
pub fn render_start_input(f: &mut Frame, state: &StartInputState, area: Rect) {
    let modal_area = create_modal_area(area, 13);
    f.render_widget(Clear, modal_area);

    let mut lines = vec![Line::raw("")];
    lines.push(Line::raw(if state.editing_field == 0 {
        "Keyword: (editing)"
    } else {
        "Keyword:"
    }));
    lines.push(input_line(&state.keyword, state.editing_field == 0));
    lines.push(Line::raw(""));
    lines.push(Line::raw(if state.editing_field == 1 {
        "Tags (optional): (editing)"
    } else {
        "Tags (optional):"
    }));
    lines.push(input_line(&state.tags, state.editing_field == 1));
    lines.push(Line::raw(""));
    if let Some(error) = &state.error {
        lines.push(Line::styled(format!("Error: {}", error), error_style()));
    }
    lines.push(Line::styled(
        "Tab to switch fields  ·  Enter to continue  ·  Esc to cancel",
        hint_style(),
    ));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Start Tracking ", modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
