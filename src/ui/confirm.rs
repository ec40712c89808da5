use crate::ui::{
    layout::create_modal_area,
    styles::{hint_style, modal_bg_style, modal_title_style, selected_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Yes/No question, answering No unless told otherwise
#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub message: String,
    pub yes: bool,
}

impl ConfirmState {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            yes: false,
        }
    }
}

/// Render the confirmation modal
pub fn render_confirm(f: &mut Frame, state: &ConfirmState, area: Rect) {
    let modal_area = create_modal_area(area, 9);
    f.render_widget(Clear, modal_area);

    let choice = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!(" {} ", label), selected_style())
        } else {
            Span::raw(format!(" {} ", label))
        }
    };

    let lines = vec![
        Line::raw(""),
        Line::raw(format!("  {}", state.message)),
        Line::raw(""),
        Line::from(vec![
            Span::raw("  "),
            choice("Yes", state.yes),
            Span::raw("   "),
            choice("No", !state.yes),
        ]),
        Line::raw(""),
        Line::styled("  y/n · ←/→ to choose · Enter to accept · Esc to cancel", hint_style()),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Confirm ", modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
