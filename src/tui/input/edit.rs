use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::editor::Editor;
use crate::model::position::Position;
use crate::tui::app::App;
use crate::util::unicode::{next_grapheme_col, prev_grapheme_col, word_start_before};

/// Text-changing keys. Returns false when the key is not an edit.
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Char('w') if ctrl => delete_word_back(app),
        KeyCode::Char(c) if !ctrl && !alt => insert_text(app, c.encode_utf8(&mut [0; 4])),
        KeyCode::Enter if !ctrl && !alt => insert_text(app, "\n"),
        KeyCode::Tab => insert_text(app, "\t"),
        KeyCode::Backspace if ctrl || alt => delete_word_back(app),
        KeyCode::Backspace => backspace(app),
        KeyCode::Delete => delete_forward(app),
        _ => return false,
    }
    true
}

/// Insert at the cursor. The buffer refuses text inside locked ranges.
pub(super) fn insert_text(app: &mut App, text: &str) {
    let pos = app.doc.buffer.cursor();
    match app.doc.buffer.replace_range(text, pos, pos) {
        Ok(()) => app.dirty = true,
        Err(e) => app.refuse_edit(e),
    }
}

fn delete_range(app: &mut App, from: Position, to: Position) {
    if from == to {
        return;
    }
    match app.doc.buffer.replace_range("", from, to) {
        Ok(()) => app.dirty = true,
        Err(e) => app.refuse_edit(e),
    }
}

fn backspace(app: &mut App) {
    let buf = &app.doc.buffer;
    let pos = buf.cursor();
    let from = if pos.ch > 0 {
        let line = buf.line(pos.line).unwrap_or_default();
        Position::new(pos.line, prev_grapheme_col(line, pos.ch).unwrap_or(0))
    } else if pos.line > 0 {
        buf.end_of_line(pos.line - 1)
    } else {
        return;
    };
    delete_range(app, from, pos);
}

fn delete_forward(app: &mut App) {
    let buf = &app.doc.buffer;
    let pos = buf.cursor();
    let line = buf.line(pos.line).unwrap_or_default();
    let to = match next_grapheme_col(line, pos.ch) {
        Some(ch) => Position::new(pos.line, ch),
        None if pos.line < buf.last_line() => Position::line_start(pos.line + 1),
        None => return,
    };
    delete_range(app, pos, to);
}

fn delete_word_back(app: &mut App) {
    let buf = &app.doc.buffer;
    let pos = buf.cursor();
    if pos.ch == 0 {
        backspace(app);
        return;
    }
    let line = buf.line(pos.line).unwrap_or_default();
    let from = Position::new(pos.line, word_start_before(line, pos.ch));
    delete_range(app, from, pos);
}
