use crate::editor::{FieldEditor, InputMode};
use crate::ui::{
    layout::create_modal_area,
    styles::{error_style, hint_style, modal_bg_style, modal_title_style, running_style, selected_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const HELP: &str = "Tab/↑↓ navigate · Enter save · Esc cancel · Shift+Tab mode";

fn mode_bar(current: InputMode) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for mode in InputMode::ALL {
        let text = format!(" F{} {} ", mode.hotkey(), mode.label());
        if mode == current {
            spans.push(Span::styled(text, selected_style()));
        } else {
            spans.push(Span::styled(text, hint_style()));
        }
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Render the entry editor as a modal
pub fn render_field_editor(f: &mut Frame, editor: &FieldEditor, area: Rect) {
    let modal_area = create_modal_area(area, 22);
    f.render_widget(Clear, modal_area);

    let entry = editor.original();
    let status = if entry.active {
        Span::styled("running", running_style())
    } else {
        Span::raw("completed")
    };

    let mut lines = vec![
        mode_bar(editor.mode()),
        Line::raw(""),
        Line::from(vec![
            Span::raw(format!(" Entry #{} · ", entry.short_id)),
            status,
        ]),
        Line::raw(""),
    ];

    for (i, field) in editor.fields().iter().enumerate() {
        let focused = i == editor.focused();
        let label = if focused {
            format!(" {}: (editing)", field.name.label())
        } else {
            format!(" {}:", field.name.label())
        };
        lines.push(Line::from(vec![
            Span::raw(label),
            Span::raw("  "),
            Span::styled(field.name.hint(editor.mode()), hint_style()),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" > "),
            Span::styled(field.value.as_str(), modal_title_style()),
            if focused {
                Span::styled("█", modal_title_style())
            } else {
                Span::raw("")
            },
        ]));
        lines.push(Line::raw(""));
    }

    if let Some(err) = editor.error() {
        lines.push(Line::styled(format!(" Error: {}", err), error_style()));
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(format!(" {}", HELP), hint_style()));

    let title = format!(" Edit Entry · {} ", editor.mode().label());
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
