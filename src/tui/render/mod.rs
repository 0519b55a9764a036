pub mod document_view;
pub mod header;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Main render function: header, document, status row
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (2 rows) | document | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // file name + separator
            Constraint::Min(1),    // document
            Constraint::Length(1), // status row
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);
    document_view::render_document_view(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use insta::assert_snapshot;

    #[test]
    fn stream_document_with_hints() {
        let (_tmp, mut app) = app_with_text(
            "#stream\n2024-06-01 08:00:00   one\n2024-06-01 08:01:00   ",
        );
        let output = render_to_string(48, 6, |frame, _area| {
            render(frame, &mut app);
        });
        assert_snapshot!(output, @r"
         ▶ journal.md                           #stream
        ────────────────────────────────────────────────
        #stream
        2024-06-01 08:00:00   one
        2024-06-01 08:01:00
                      Alt+Enter submit  ^S save  ^Q quit
        ");
    }

    #[test]
    fn untagged_document_shows_inactive() {
        let (_tmp, mut app) = app_with_text("notes\nplain text");
        let output = render_to_string(48, 5, |frame, _area| {
            render(frame, &mut app);
        });
        assert_snapshot!(output, @r"
         ▶ journal.md                          inactive
        ────────────────────────────────────────────────
        notes
        plain text
         not tagged #stream, stream inactive
        ");
    }
}
