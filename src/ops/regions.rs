use std::fmt;

use serde::Serialize;

use crate::model::editor::{EditError, Editor};
use crate::model::mark::{LOCKED_LINE_CLASS, MarkId, MarkOptions, TIMESTAMP_CLASS};
use crate::model::position::Position;

/// More marks of one kind were found at a line start than the log allows.
///
/// Recovered by clearing all of them and creating a single fresh mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityWarning {
    pub line: usize,
    pub class: String,
    pub found: usize,
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: found {} '{}' marks, expected at most one; cleared all",
            self.line, self.found, self.class
        )
    }
}

/// Marks of `class` that start at column 0 of `line`, in creation order
pub fn line_marks<E: Editor>(editor: &E, line: usize, class: &str) -> Vec<MarkId> {
    let start = Position::line_start(line);
    editor
        .find_marks_with_class(start, class)
        .into_iter()
        .filter(|id| editor.mark(*id).is_some_and(|m| m.from == start))
        .collect()
}

/// Remove every mark of `class` starting at column 0 of `line`.
/// Returns a warning when more than one was found.
pub fn clear_line_marks<E: Editor>(
    editor: &mut E,
    line: usize,
    class: &str,
) -> Option<IntegrityWarning> {
    let found = line_marks(editor, line, class);
    for id in &found {
        editor.clear_mark(*id);
    }
    (found.len() > 1).then(|| IntegrityWarning {
        line,
        class: class.to_string(),
        found: found.len(),
    })
}

/// Lock `[0, prefix_len)` of `line` as a timestamp prefix.
///
/// Existing timestamp marks on the line are cleared first, so repeated calls
/// leave exactly one mark.
pub fn lock_timestamp_prefix<E: Editor>(
    editor: &mut E,
    line: usize,
    prefix_len: usize,
) -> Option<IntegrityWarning> {
    let warning = clear_line_marks(editor, line, TIMESTAMP_CLASS);
    editor.mark_text(
        Position::line_start(line),
        Position::new(line, prefix_len),
        MarkOptions::timestamp(),
    );
    warning
}

/// Lock the entire current text of `line`.
pub fn lock_whole_line<E: Editor>(editor: &mut E, line: usize) -> Option<IntegrityWarning> {
    let warning = clear_line_marks(editor, line, LOCKED_LINE_CLASS);
    let eol = editor.end_of_line(line);
    editor.mark_text(Position::line_start(line), eol, MarkOptions::locked_line());
    warning
}

/// Insert `"\n" + text` at the end of `line`.
///
/// A whole-line lock on `line` refuses insertions at its end, so it is
/// lifted for the insertion and re-established over the same text.
pub fn append_line_after<E: Editor>(
    editor: &mut E,
    line: usize,
    text: &str,
) -> Result<Vec<IntegrityWarning>, EditError> {
    let locked = is_line_locked(editor, line);
    let mut warnings = Vec::new();
    if locked {
        warnings.extend(clear_line_marks(editor, line, LOCKED_LINE_CLASS));
    }
    let eol = editor.end_of_line(line);
    let inserted = editor.replace_range(&format!("\n{}", text), eol, eol);
    if locked {
        warnings.extend(lock_whole_line(editor, line));
    }
    inserted.map(|()| warnings)
}

/// Whether `line` carries a whole-line lock
pub fn is_line_locked<E: Editor>(editor: &E, line: usize) -> bool {
    !line_marks(editor, line, LOCKED_LINE_CLASS).is_empty()
}

/// Ranges of all live marks of `class`, sorted by position
pub fn marked_ranges<E: Editor>(editor: &E, class: &str) -> Vec<(Position, Position)> {
    let mut ranges: Vec<(Position, Position)> = editor
        .all_marks()
        .into_iter()
        .filter_map(|id| editor.mark(id))
        .filter(|m| m.options.has_class(class))
        .map(|m| (m.from, m.to))
        .collect();
    ranges.sort();
    ranges
}

/// Ranges of all locked timestamp prefixes, sorted
pub fn locked_prefix_ranges<E: Editor>(editor: &E) -> Vec<(Position, Position)> {
    marked_ranges(editor, TIMESTAMP_CLASS)
}

/// Ranges of all whole-line locks, sorted
pub fn locked_line_ranges<E: Editor>(editor: &E) -> Vec<(Position, Position)> {
    marked_ranges(editor, LOCKED_LINE_CLASS)
}
