use indexmap::IndexMap;

use super::editor::{EditError, Editor};
use super::mark::{Mark, MarkId, MarkOptions};
use super::position::Position;

/// In-memory text document implementing [`Editor`].
///
/// Marks follow edits the way CodeMirror text markers do: positions before a
/// change stay put, positions after it shift, and a mark whose range collapses
/// to nothing is dropped. Inclusivity decides which side of an insertion at a
/// mark boundary the boundary ends up on.
#[derive(Debug, Clone)]
pub struct Buffer {
    lines: Vec<String>,
    marks: IndexMap<MarkId, Mark>,
    next_mark: u64,
    cursor: Position,
}

impl Default for Buffer {
    fn default() -> Self {
        Buffer::from_text("")
    }
}

/// A single replacement expressed in old and new coordinates
struct Change {
    from: Position,
    to: Position,
    /// End of the inserted text, in post-edit coordinates
    end: Position,
}

impl Change {
    fn map(&self, pos: Position, bias_after: bool) -> Position {
        if pos < self.from {
            return pos;
        }
        if pos > self.to {
            return self.shift(pos);
        }
        // from <= pos <= to
        if self.from == self.to {
            return if bias_after { self.end } else { self.from };
        }
        if pos == self.to {
            self.end
        } else if pos == self.from {
            self.from
        } else if bias_after {
            self.end
        } else {
            self.from
        }
    }

    fn shift(&self, pos: Position) -> Position {
        if pos.line == self.to.line {
            Position::new(self.end.line, self.end.ch + (pos.ch - self.to.ch))
        } else {
            Position::new(pos.line - self.to.line + self.end.line, pos.ch)
        }
    }
}

/// Byte offset of the `ch`-th character of `s` (or `s.len()` at the end)
fn byte_index(s: &str, ch: usize) -> usize {
    s.char_indices().nth(ch).map_or(s.len(), |(i, _)| i)
}

impl Buffer {
    /// Build a document from text. Lines are split on `\n`; a trailing `\r` is dropped.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Buffer {
            lines,
            marks: IndexMap::new(),
            next_mark: 1,
            cursor: Position::new(0, 0),
        }
    }

    /// The full document text, lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Marks in creation order
    pub fn marks(&self) -> impl Iterator<Item = (&MarkId, &Mark)> {
        self.marks.iter()
    }

    fn check_pos(&self, pos: Position) -> Result<(), EditError> {
        match self.lines.get(pos.line) {
            Some(line) if pos.ch <= line.chars().count() => Ok(()),
            _ => Err(EditError::OutOfRange(pos)),
        }
    }

    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        Position::new(line, pos.ch.min(self.line_len(line)))
    }
}

impl Editor for Buffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, n: usize) -> Option<&str> {
        self.lines.get(n).map(|l| l.as_str())
    }

    fn replace_range(
        &mut self,
        text: &str,
        from: Position,
        to: Position,
    ) -> Result<(), EditError> {
        let (from, to) = if to < from { (to, from) } else { (from, to) };
        self.check_pos(from)?;
        self.check_pos(to)?;
        if self.is_read_only(from, to) {
            return Err(EditError::ReadOnly { from, to });
        }

        let head = {
            let line = &self.lines[from.line];
            line[..byte_index(line, from.ch)].to_string()
        };
        let tail = {
            let line = &self.lines[to.line];
            line[byte_index(line, to.ch)..].to_string()
        };

        let pieces: Vec<&str> = text
            .split('\n')
            .map(|p| p.strip_suffix('\r').unwrap_or(p))
            .collect();
        let last_piece_len = pieces.last().map_or(0, |p| p.chars().count());
        let end = if pieces.len() == 1 {
            Position::new(from.line, from.ch + last_piece_len)
        } else {
            Position::new(from.line + pieces.len() - 1, last_piece_len)
        };

        let mut replacement: Vec<String> = pieces.iter().map(|p| p.to_string()).collect();
        replacement[0] = format!("{}{}", head, replacement[0]);
        if let Some(last) = replacement.last_mut() {
            last.push_str(&tail);
        }
        self.lines.splice(from.line..=to.line, replacement);

        let change = Change { from, to, end };
        self.marks.retain(|_, mark| {
            let was_empty = mark.from == mark.to;
            let new_from = change.map(mark.from, !mark.options.inclusive_left);
            let new_to = change.map(mark.to, mark.options.inclusive_right);
            if new_to < new_from || (new_to == new_from && !was_empty) {
                return false;
            }
            mark.from = new_from;
            mark.to = new_to;
            true
        });
        self.cursor = change.map(self.cursor, true);
        Ok(())
    }

    fn mark_text(&mut self, from: Position, to: Position, options: MarkOptions) -> MarkId {
        let (from, to) = if to < from { (to, from) } else { (from, to) };
        let id = MarkId(self.next_mark);
        self.next_mark += 1;
        let mark = Mark {
            from: self.clamp(from),
            to: self.clamp(to),
            options,
        };
        self.marks.insert(id, mark);
        id
    }

    fn find_marks_at(&self, pos: Position) -> Vec<MarkId> {
        self.marks
            .iter()
            .filter(|(_, m)| m.contains(pos))
            .map(|(id, _)| *id)
            .collect()
    }

    fn all_marks(&self) -> Vec<MarkId> {
        self.marks.keys().copied().collect()
    }

    fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(&id)
    }

    fn clear_mark(&mut self, id: MarkId) -> bool {
        self.marks.shift_remove(&id).is_some()
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.clamp(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mark::TIMESTAMP_CLASS;

    #[test]
    fn empty_text_has_one_line() {
        let buf = Buffer::from_text("");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), Some(""));
    }

    #[test]
    fn crlf_is_normalized() {
        let buf = Buffer::from_text("a\r\nb");
        assert_eq!(buf.lines(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn replace_within_line() {
        let mut buf = Buffer::from_text("hello world");
        buf.replace_range("there", Position::new(0, 6), Position::new(0, 11))
            .unwrap();
        assert_eq!(buf.text(), "hello there");
    }

    #[test]
    fn insert_newline_splits_line() {
        let mut buf = Buffer::from_text("abc");
        buf.replace_range("\nxy", Position::new(0, 3), Position::new(0, 3))
            .unwrap();
        assert_eq!(buf.lines(), &["abc".to_string(), "xy".to_string()]);
    }

    #[test]
    fn multibyte_columns_are_chars() {
        let mut buf = Buffer::from_text("héllo");
        assert_eq!(buf.line_len(0), 5);
        buf.replace_range("!", Position::new(0, 2), Position::new(0, 2))
            .unwrap();
        assert_eq!(buf.text(), "hé!llo");
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut buf = Buffer::from_text("abc");
        let err = buf
            .replace_range("x", Position::new(0, 4), Position::new(0, 4))
            .unwrap_err();
        assert_eq!(err, EditError::OutOfRange(Position::new(0, 4)));
        assert!(buf.replace_range("x", Position::new(1, 0), Position::new(1, 0)).is_err());
    }

    #[test]
    fn read_only_mark_blocks_edits_inside() {
        let mut buf = Buffer::from_text("2023-01-01 10:00:00   note");
        buf.mark_text(
            Position::new(0, 0),
            Position::new(0, 22),
            MarkOptions::timestamp(),
        );
        let err = buf
            .replace_range("X", Position::new(0, 3), Position::new(0, 4))
            .unwrap_err();
        assert!(matches!(err, EditError::ReadOnly { .. }));
        assert!(buf.replace_range("X", Position::new(0, 0), Position::new(0, 0)).is_err());
        // Right after the separator is editable
        buf.replace_range("my ", Position::new(0, 22), Position::new(0, 22))
            .unwrap();
        assert_eq!(buf.text(), "2023-01-01 10:00:00   my note");
    }

    #[test]
    fn typing_at_right_boundary_does_not_grow_mark() {
        let mut buf = Buffer::from_text("ts   ");
        let id = buf.mark_text(
            Position::new(0, 0),
            Position::new(0, 5),
            MarkOptions::timestamp(),
        );
        buf.replace_range("abc", Position::new(0, 5), Position::new(0, 5))
            .unwrap();
        assert_eq!(buf.mark(id).unwrap().to, Position::new(0, 5));
    }

    #[test]
    fn marks_shift_when_lines_are_inserted_above() {
        let mut buf = Buffer::from_text("head\nts   body");
        let id = buf.mark_text(
            Position::new(1, 0),
            Position::new(1, 5),
            MarkOptions::timestamp(),
        );
        buf.replace_range("new\n", Position::new(0, 0), Position::new(0, 0))
            .unwrap();
        let mark = buf.mark(id).unwrap();
        assert_eq!(mark.from, Position::new(2, 0));
        assert_eq!(mark.to, Position::new(2, 5));
    }

    #[test]
    fn marks_shift_along_the_same_line() {
        let mut buf = Buffer::from_text("ab ts");
        let id = buf.mark_text(Position::new(0, 3), Position::new(0, 5), MarkOptions::timestamp());
        buf.replace_range("ZZZ", Position::new(0, 0), Position::new(0, 1))
            .unwrap();
        let mark = buf.mark(id).unwrap();
        assert_eq!(mark.from, Position::new(0, 5));
        assert_eq!(mark.to, Position::new(0, 7));
    }

    #[test]
    fn collapsed_mark_is_dropped() {
        let mut buf = Buffer::from_text("abcdef");
        let opts = MarkOptions {
            read_only: false,
            class: None,
            inclusive_left: false,
            inclusive_right: false,
        };
        let id = buf.mark_text(Position::new(0, 1), Position::new(0, 3), opts);
        buf.replace_range("", Position::new(0, 0), Position::new(0, 4))
            .unwrap();
        assert!(buf.mark(id).is_none());
    }

    #[test]
    fn find_marks_at_uses_inclusive_lookup() {
        let mut buf = Buffer::from_text("2023-01-01 10:00:00   a\nb");
        let id = buf.mark_text(Position::new(0, 0), Position::new(0, 22), MarkOptions::timestamp());
        assert_eq!(buf.find_marks_at(Position::new(0, 0)), vec![id]);
        assert_eq!(buf.find_marks_at(Position::new(0, 22)), vec![id]);
        assert!(buf.find_marks_at(Position::new(1, 0)).is_empty());
        assert_eq!(
            buf.find_marks_with_class(Position::new(0, 0), TIMESTAMP_CLASS),
            vec![id]
        );
    }

    #[test]
    fn clear_mark_reports_liveness() {
        let mut buf = Buffer::from_text("abc");
        let id = buf.mark_text(Position::new(0, 0), Position::new(0, 1), MarkOptions::timestamp());
        assert!(buf.clear_mark(id));
        assert!(!buf.clear_mark(id));
        assert!(buf.all_marks().is_empty());
    }

    #[test]
    fn index_and_pos_conversions_agree() {
        let buf = Buffer::from_text("ab\ncde\n");
        assert_eq!(buf.index_from_pos(Position::new(1, 1)), 4);
        assert_eq!(buf.pos_from_index(4), Position::new(1, 1));
        assert_eq!(buf.pos_from_index(7), Position::new(2, 0));
        assert_eq!(buf.pos_from_index(100), Position::new(2, 0));
    }

    #[test]
    fn cursor_follows_insertions() {
        let mut buf = Buffer::from_text("abc");
        buf.set_cursor(Position::new(0, 3));
        buf.replace_range("d", Position::new(0, 3), Position::new(0, 3))
            .unwrap();
        assert_eq!(buf.cursor(), Position::new(0, 4));
        buf.set_cursor(Position::new(9, 9));
        assert_eq!(buf.cursor(), Position::new(0, 4));
    }
}
