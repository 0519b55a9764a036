use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::editor::Editor;
use crate::ops::regions::{locked_line_ranges, locked_prefix_ranges};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::unicode::{char_to_byte, char_to_display_col, display_col_to_byte};

/// Render the visible slice of the document.
///
/// Locked timestamp prefixes use the timestamp color; lines under a
/// whole-line lock are dimmed. Scroll offsets are adjusted first so the
/// cursor stays on screen.
pub fn render_document_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let height = area.height as usize;
    app.view_height = height;
    app.scroll_to_cursor(height, area.width as usize);

    let stamps = locked_prefix_ranges(&app.doc.buffer);
    let locked = locked_line_ranges(&app.doc.buffer);
    let cursor_line = app.doc.buffer.cursor().line;

    let lines: Vec<Line> = app
        .doc
        .buffer
        .lines()
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(height)
        .map(|(n, text)| {
            let stamp = stamps
                .iter()
                .find(|(from, _)| from.line == n)
                .map(|(from, to)| (from.ch, to.ch));
            let is_locked = locked.iter().any(|(from, _)| from.line == n);
            let line = Line::from(line_spans(text, stamp, is_locked, app.h_scroll, &app.theme));
            if n == cursor_line {
                line.style(Style::default().bg(app.theme.cursor_line_bg))
            } else {
                line
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines).style(
        Style::default()
            .fg(app.theme.text)
            .bg(app.theme.background),
    );
    frame.render_widget(paragraph, area);

    if let Some(cell) = cursor_cell(app, area) {
        frame.set_cursor_position(cell);
    }
}

/// Split one line into body and timestamp spans, starting at display column `h_scroll`.
fn line_spans(
    text: &str,
    stamp: Option<(usize, usize)>,
    locked: bool,
    h_scroll: usize,
    theme: &Theme,
) -> Vec<Span<'static>> {
    let (start, end) = stamp.unwrap_or((0, 0));
    let body = Style::default().fg(if locked { theme.locked } else { theme.text });
    let bounds = [
        0,
        char_to_byte(text, start),
        char_to_byte(text, end),
        text.len(),
    ];
    let styles = [body, Style::default().fg(theme.timestamp), body];

    let cut = display_col_to_byte(text, h_scroll);
    let mut spans = Vec::new();
    for (i, style) in styles.into_iter().enumerate() {
        let (a, b) = (bounds[i].max(cut), bounds[i + 1].max(cut));
        if a < b {
            spans.push(Span::styled(text[a..b].replace('\t', "    "), style));
        }
    }
    spans
}

/// Screen cell of the cursor, if it is inside `area`.
pub fn cursor_cell(app: &App, area: Rect) -> Option<(u16, u16)> {
    let cursor = app.doc.buffer.cursor();
    let row = cursor.line.checked_sub(app.scroll)?;
    let line = app.doc.buffer.line(cursor.line).unwrap_or_default();
    let col = char_to_display_col(line, cursor.ch).checked_sub(app.h_scroll)?;
    if row >= area.height as usize || col >= area.width as usize {
        return None;
    }
    Some((area.x + col as u16, area.y + row as u16))
}
