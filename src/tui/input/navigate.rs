use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::editor::Editor;
use crate::model::position::Position;
use crate::tui::app::App;
use crate::util::unicode::{
    char_to_display_col, display_col_to_char, next_grapheme_col, prev_grapheme_col,
    word_start_after, word_start_before,
};

/// Cursor movement keys
pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let word = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    let page = app.view_height.max(1);
    match key.code {
        KeyCode::Left if word => move_word_left(app),
        KeyCode::Left => move_left(app),
        KeyCode::Right if word => move_word_right(app),
        KeyCode::Right => move_right(app),
        KeyCode::Up => move_vertical(app, -1),
        KeyCode::Down => move_vertical(app, 1),
        KeyCode::PageUp => move_vertical(app, -(page as isize)),
        KeyCode::PageDown => move_vertical(app, page as isize),
        KeyCode::Home if ctrl => app.doc.buffer.set_cursor(Position::new(0, 0)),
        KeyCode::End if ctrl => {
            let last = app.doc.buffer.last_line();
            let end = app.doc.buffer.end_of_line(last);
            app.doc.buffer.set_cursor(end);
        }
        KeyCode::Home => move_line_start(app),
        KeyCode::Char('a') if ctrl => move_line_start(app),
        KeyCode::End => move_line_end(app),
        KeyCode::Char('e') if ctrl => move_line_end(app),
        _ => {}
    }
}

fn move_line_start(app: &mut App) {
    let line = app.doc.buffer.cursor().line;
    app.doc.buffer.set_cursor(Position::line_start(line));
}

fn move_line_end(app: &mut App) {
    let line = app.doc.buffer.cursor().line;
    let end = app.doc.buffer.end_of_line(line);
    app.doc.buffer.set_cursor(end);
}

fn move_left(app: &mut App) {
    let buf = &app.doc.buffer;
    let pos = buf.cursor();
    let line = buf.line(pos.line).unwrap_or_default();
    let target = match prev_grapheme_col(line, pos.ch) {
        Some(ch) => Position::new(pos.line, ch),
        None if pos.line > 0 => buf.end_of_line(pos.line - 1),
        None => return,
    };
    app.doc.buffer.set_cursor(target);
}

fn move_right(app: &mut App) {
    let buf = &app.doc.buffer;
    let pos = buf.cursor();
    let line = buf.line(pos.line).unwrap_or_default();
    let target = match next_grapheme_col(line, pos.ch) {
        Some(ch) => Position::new(pos.line, ch),
        None if pos.line < buf.last_line() => Position::line_start(pos.line + 1),
        None => return,
    };
    app.doc.buffer.set_cursor(target);
}

fn move_word_left(app: &mut App) {
    let pos = app.doc.buffer.cursor();
    if pos.ch == 0 {
        move_left(app);
        return;
    }
    let line = app.doc.buffer.line(pos.line).unwrap_or_default();
    let ch = word_start_before(line, pos.ch);
    app.doc.buffer.set_cursor(Position::new(pos.line, ch));
}

fn move_word_right(app: &mut App) {
    let pos = app.doc.buffer.cursor();
    if pos.ch >= app.doc.buffer.line_len(pos.line) {
        move_right(app);
        return;
    }
    let line = app.doc.buffer.line(pos.line).unwrap_or_default();
    let ch = word_start_after(line, pos.ch);
    app.doc.buffer.set_cursor(Position::new(pos.line, ch));
}

/// Move by `delta` lines, keeping the display column where possible.
fn move_vertical(app: &mut App, delta: isize) {
    let buf = &app.doc.buffer;
    let pos = buf.cursor();
    let target = pos
        .line
        .saturating_add_signed(delta)
        .min(buf.last_line());
    if target == pos.line {
        return;
    }
    let col = char_to_display_col(buf.line(pos.line).unwrap_or_default(), pos.ch);
    let line = buf.line(target).unwrap_or_default();
    let ch = display_col_to_char(line, col);
    app.doc.buffer.set_cursor(Position::new(target, ch));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::app_with_text;

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_navigate(app, KeyEvent::new(code, modifiers));
    }

    #[test]
    fn left_right_wrap_across_lines() {
        let (_tmp, mut app) = app_with_text("#stream\nab\ncd");
        app.doc.buffer.set_cursor(Position::new(2, 0));
        press(&mut app, KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 2));
        press(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.doc.buffer.cursor(), Position::new(2, 0));
    }

    #[test]
    fn vertical_keeps_display_column() {
        let (_tmp, mut app) = app_with_text("#stream\n你好x\nabcdef");
        app.doc.buffer.set_cursor(Position::new(2, 4));
        press(&mut app, KeyCode::Up, KeyModifiers::NONE);
        // Column 4 lands after 你好
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 2));
    }

    #[test]
    fn vertical_stops_at_document_edges() {
        let (_tmp, mut app) = app_with_text("#stream\nab");
        press(&mut app, KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 2));
        press(&mut app, KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(app.doc.buffer.cursor(), Position::new(0, 2));
    }

    #[test]
    fn home_end_and_document_jumps() {
        let (_tmp, mut app) = app_with_text("#stream\nhello world");
        press(&mut app, KeyCode::Home, KeyModifiers::NONE);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 0));
        press(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 11));
        press(&mut app, KeyCode::Home, KeyModifiers::CONTROL);
        assert_eq!(app.doc.buffer.cursor(), Position::new(0, 0));
        press(&mut app, KeyCode::End, KeyModifiers::CONTROL);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 11));
    }

    #[test]
    fn word_motion() {
        let (_tmp, mut app) = app_with_text("#stream\nhello world");
        press(&mut app, KeyCode::Left, KeyModifiers::ALT);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 6));
        press(&mut app, KeyCode::Left, KeyModifiers::CONTROL);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 0));
        press(&mut app, KeyCode::Right, KeyModifiers::CONTROL);
        assert_eq!(app.doc.buffer.cursor(), Position::new(1, 6));
    }
}
