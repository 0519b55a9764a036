use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::stream::SUBMIT_THOUGHT;
use crate::tui::app::{App, StatusKind};
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = Vec::new();
    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => app.theme.green,
            StatusKind::Warning => app.theme.yellow,
            StatusKind::Error => app.theme.red,
        };
        spans.push(Span::styled(
            truncate_to_width(&format!(" {}", status.text), width),
            Style::default().fg(color).bg(bg),
        ));
    }

    // Key hints, right-aligned, only when they fit
    if app.show_key_hints {
        let hint = key_hints();
        let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        let hint_width = display_width(&hint);
        if content_width + hint_width < width {
            let padding = width - content_width - hint_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// `Alt+Enter submit  ^S save  ^Q quit`, from the registered hotkey
fn key_hints() -> String {
    let hotkey = SUBMIT_THOUGHT.hotkey;
    let mut combo: Vec<&str> = hotkey.modifiers.to_vec();
    combo.push(hotkey.key);
    format!("{} submit  ^S save  ^Q quit", combo.join("+"))
}
