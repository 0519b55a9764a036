use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::parse::tags::normalize_tag;
use crate::tui::app::App;
use crate::util::unicode::{display_width, truncate_to_width};

/// Render the header: file name and stream state, with a separator line below
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // separator
        ])
        .split(area);

    render_title(frame, app, chunks[0]);

    let separator = Span::styled(
        "\u{2500}".repeat(area.width as usize),
        Style::default().fg(app.theme.dim).bg(app.theme.background),
    );
    frame.render_widget(Paragraph::new(Line::from(separator)), chunks[1]);
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let bg = app.theme.background;

    // Tag when the stream is live, otherwise a dim marker
    let (state, state_style) = if app.active {
        (
            normalize_tag(app.stream.tag()),
            Style::default().fg(app.theme.highlight).bg(bg),
        )
    } else {
        ("inactive".to_string(), Style::default().fg(app.theme.dim).bg(bg))
    };
    let modified = if app.dirty { " \u{25CF}" } else { "" };

    let name = app
        .doc
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| app.doc.path.display().to_string());
    // " ▶ " + name + marker, then state and one trailing space
    let budget = width.saturating_sub(3 + display_width(modified) + display_width(&state) + 2);
    let name = truncate_to_width(&name, budget);

    let mut spans = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("\u{25B6}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(name, Style::default().fg(app.theme.text_bright).bg(bg)),
        Span::styled(modified, Style::default().fg(app.theme.yellow).bg(bg)),
    ];

    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let state_width = display_width(&state) + 1;
    if used + state_width < width {
        spans.push(Span::styled(
            " ".repeat(width - used - state_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(state, state_style));
        spans.push(Span::styled(" ", Style::default().bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
