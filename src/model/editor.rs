use std::fmt;

use super::mark::{Mark, MarkId, MarkOptions};
use super::position::Position;

/// Error type for edits applied through an [`Editor`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("range {from}..{to} touches a read-only mark")]
    ReadOnly { from: Position, to: Position },
    #[error("position {0} is outside the document")]
    OutOfRange(Position),
}

/// The kind of view the host shows a document in.
///
/// Only markdown views carry an editable text surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    Markdown,
    Other(String),
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Markdown => write!(f, "markdown"),
            ViewKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// Line-indexed text surface with range marking, as provided by the host editor.
///
/// A document always has at least one line. Lines never contain `\n`.
/// Read-only marks apply to every edit made through [`Editor::replace_range`],
/// including the stream's own; callers clear marks before rewriting marked text.
pub trait Editor {
    fn line_count(&self) -> usize;

    /// Text of line `n`, without its line terminator
    fn line(&self, n: usize) -> Option<&str>;

    /// Replace `[from, to)` with `text`. `text` may contain `\n`.
    fn replace_range(&mut self, text: &str, from: Position, to: Position)
    -> Result<(), EditError>;

    /// Mark `[from, to)` with the given options and return its handle.
    fn mark_text(&mut self, from: Position, to: Position, options: MarkOptions) -> MarkId;

    /// All live marks whose range contains `pos` (both ends inclusive), in creation order.
    fn find_marks_at(&self, pos: Position) -> Vec<MarkId>;

    /// All live marks, in creation order.
    fn all_marks(&self) -> Vec<MarkId>;

    /// Current range and options of a live mark
    fn mark(&self, id: MarkId) -> Option<&Mark>;

    /// Remove a mark. Returns false if it was already gone.
    fn clear_mark(&mut self, id: MarkId) -> bool;

    fn cursor(&self) -> Position;

    fn set_cursor(&mut self, pos: Position);

    fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    /// Character length of line `n` (0 for lines past the end)
    fn line_len(&self, n: usize) -> usize {
        self.line(n).map_or(0, |l| l.chars().count())
    }

    fn end_of_line(&self, n: usize) -> Position {
        Position::new(n, self.line_len(n))
    }

    /// Character offset of `pos` from the start of the document.
    /// Each line terminator counts as one character.
    fn index_from_pos(&self, pos: Position) -> usize {
        let line = pos.line.min(self.last_line());
        let before: usize = (0..line).map(|n| self.line_len(n) + 1).sum();
        before + pos.ch.min(self.line_len(line))
    }

    /// Inverse of [`Editor::index_from_pos`], clamped to the document.
    fn pos_from_index(&self, index: usize) -> Position {
        let mut remaining = index;
        for n in 0..self.line_count() {
            let len = self.line_len(n);
            if remaining <= len {
                return Position::new(n, remaining);
            }
            remaining -= len + 1;
        }
        self.end_of_line(self.last_line())
    }

    /// Live marks at `pos` carrying the given class
    fn find_marks_with_class(&self, pos: Position, class: &str) -> Vec<MarkId> {
        self.find_marks_at(pos)
            .into_iter()
            .filter(|id| self.mark(*id).is_some_and(|m| m.options.has_class(class)))
            .collect()
    }

    /// Whether any read-only mark blocks replacing `[from, to)`
    fn is_read_only(&self, from: Position, to: Position) -> bool {
        self.all_marks().into_iter().any(|id| {
            self.mark(id)
                .is_some_and(|m| m.options.read_only && m.blocks_replace(from, to))
        })
    }
}
