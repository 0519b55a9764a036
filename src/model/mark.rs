use std::fmt;

use serde::Serialize;

use super::position::Position;

/// Style class of the read-only timestamp prefix of a stream line
pub const TIMESTAMP_CLASS: &str = "stream-timestamp";

/// Style class of a fully committed (whole-line) lock
pub const LOCKED_LINE_CLASS: &str = "stream-locked";

/// Opaque handle to a mark created by an [`Editor`](super::editor::Editor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MarkId(pub u64);

impl fmt::Display for MarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mark#{}", self.0)
    }
}

/// Attributes of a marked range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkOptions {
    /// Edits touching the range are refused
    pub read_only: bool,
    /// Visual class used by renderers and for mark lookup
    pub class: Option<String>,
    /// Insertions at the start position fall inside the mark
    pub inclusive_left: bool,
    /// Insertions at the end position fall inside the mark
    pub inclusive_right: bool,
}

impl MarkOptions {
    /// Options for a locked timestamp prefix.
    ///
    /// Right-exclusive so typing right after the separator stays possible.
    pub fn timestamp() -> Self {
        MarkOptions {
            read_only: true,
            class: Some(TIMESTAMP_CLASS.to_string()),
            inclusive_left: true,
            inclusive_right: false,
        }
    }

    /// Options for a fully committed line.
    ///
    /// Inclusive on both ends: nothing can be typed before or after it.
    pub fn locked_line() -> Self {
        MarkOptions {
            read_only: true,
            class: Some(LOCKED_LINE_CLASS.to_string()),
            inclusive_left: true,
            inclusive_right: true,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.as_deref() == Some(class)
    }
}

/// A marked range `[from, to)` with its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mark {
    pub from: Position,
    pub to: Position,
    pub options: MarkOptions,
}

impl Mark {
    /// Whether an insertion at `pos` would land inside this mark.
    pub fn covers_insertion(&self, pos: Position) -> bool {
        (self.from < pos && pos < self.to)
            || (pos == self.from && self.options.inclusive_left)
            || (pos == self.to && self.options.inclusive_right)
    }

    /// Whether replacing the non-empty range `[from, to)` would touch this mark.
    pub fn overlaps(&self, from: Position, to: Position) -> bool {
        self.from < to && from < self.to
    }

    /// Whether replacing `[from, to)` (possibly empty) would modify or detach this mark.
    ///
    /// Deleting up to an inclusive boundary counts: joining a line onto the
    /// front of a left-inclusive mark would move text inside it.
    pub fn blocks_replace(&self, from: Position, to: Position) -> bool {
        if from == to {
            return self.covers_insertion(from);
        }
        self.overlaps(from, to)
            || (self.options.inclusive_left && from < self.from && self.from <= to)
            || (self.options.inclusive_right && from <= self.to && self.to < to)
    }

    /// Whether `pos` lies within `[from, to]` (lookup semantics, both ends inclusive).
    pub fn contains(&self, pos: Position) -> bool {
        self.from <= pos && pos <= self.to
    }
}
