use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::document_io::StreamDocument;
use crate::model::config::{StreamSettings, UiConfig};
use crate::ops::stream::ThoughtStream;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;

/// Render into an in-memory buffer and return it (styles included).
pub fn render_to_buffer<F>(w: u16, h: u16, f: F) -> Buffer
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();
    terminal.backend().buffer().clone()
}

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let buf = render_to_buffer(w, h, f);
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An activated app on `text`, as if `journal.md` had just been opened.
/// The temp dir holds the diagnostics log; keep it alive for the test.
pub fn app_with_text(text: &str) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let doc = StreamDocument::from_text(&tmp.path().join("journal.md"), text);
    let stream = ThoughtStream::new(StreamSettings::default()).unwrap();
    let app = App::new(
        doc,
        stream,
        &UiConfig::default(),
        tmp.path().join("diagnostics.log"),
    );
    (tmp, app)
}
