use chrono::NaiveDateTime;
use serde::Serialize;

/// A journal entry recognized on one line: `<timestamp><separator><content>`.
///
/// Never stored separately; always re-derived from the line text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thought {
    /// The text before the first separator, verbatim
    pub timestamp_str: String,
    /// `None` when `timestamp_str` is not a valid timestamp
    pub timestamp: Option<NaiveDateTime>,
    /// Everything after the first separator
    pub content: String,
}

impl Thought {
    /// Character length of the `timestamp + separator` prefix
    pub fn prefix_len(&self, separator: &str) -> usize {
        self.timestamp_str.chars().count() + separator.chars().count()
    }

    pub fn has_valid_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }
}
