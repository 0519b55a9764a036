use std::fmt;

use serde::{Deserialize, Serialize};

/// A location in a document: zero-based line and zero-based character column.
///
/// `ch` counts `char`s, not bytes. `ch == line length` is end-of-line.
/// Ordering is line first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Position { line, ch }
    }

    /// Column 0 of `line`
    pub fn line_start(line: usize) -> Self {
        Position { line, ch: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}
