use crate::model::config::{LockScope, Recognition, StreamSettings};
use crate::model::thought::Thought;
use crate::parse::thought_parser::parse_thought;
use crate::parse::timestamp::{FormatError, TimestampCodec, validate_format};

/// Error type for an unusable line layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    InvalidFormat(#[from] FormatError),
    #[error("separator cannot be empty")]
    EmptySeparator,
    #[error("separator cannot contain a line break")]
    MultilineSeparator,
}

/// How stream lines are written and recognized: codec, separator and policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLayout {
    pub codec: TimestampCodec,
    pub separator: String,
    pub recognition: Recognition,
    pub lock_scope: LockScope,
}

impl Default for StreamLayout {
    fn default() -> Self {
        let settings = StreamSettings::default();
        StreamLayout {
            codec: TimestampCodec::default(),
            separator: settings.separator,
            recognition: settings.recognition,
            lock_scope: settings.lock_scope,
        }
    }
}

impl StreamLayout {
    pub fn from_settings(settings: &StreamSettings) -> Result<Self, LayoutError> {
        validate_format(&settings.timestamp_format)?;
        if settings.separator.is_empty() {
            return Err(LayoutError::EmptySeparator);
        }
        if settings.separator.contains(['\n', '\r']) {
            return Err(LayoutError::MultilineSeparator);
        }
        let codec = TimestampCodec::new(&settings.timestamp_format)?;
        Ok(StreamLayout {
            codec,
            separator: settings.separator.clone(),
            recognition: settings.recognition,
            lock_scope: settings.lock_scope,
        })
    }

    /// Split a line at the first separator (always the permissive rule)
    pub fn parse(&self, line: &str) -> Option<Thought> {
        parse_thought(line, &self.separator, &self.codec)
    }

    /// Parse a line and apply the recognition policy.
    pub fn recognize(&self, line: &str) -> Option<Thought> {
        let thought = self.parse(line)?;
        match self.recognition {
            Recognition::Separator => Some(thought),
            Recognition::Timestamp if thought.has_valid_timestamp() => Some(thought),
            Recognition::Timestamp => None,
        }
    }

    /// `timestamp + separator`
    pub fn prefix(&self, timestamp_str: &str) -> String {
        format!("{}{}", timestamp_str, self.separator)
    }

    /// Character length of a freshly rendered prefix
    pub fn prefix_len(&self) -> usize {
        self.codec.width() + self.separator.chars().count()
    }

    /// Every recognized line with its zero-based line number
    pub fn thoughts<S: AsRef<str>>(&self, lines: &[S]) -> Vec<(usize, Thought)> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(n, line)| self.recognize(line.as_ref()).map(|t| (n, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_prefix_is_22_chars() {
        let layout = StreamLayout::default();
        assert_eq!(layout.prefix_len(), 22);
        assert_eq!(layout.prefix("2023-01-01 10:00:00"), "2023-01-01 10:00:00   ");
    }

    #[test]
    fn from_settings_validates() {
        let mut settings = StreamSettings::default();
        assert!(StreamLayout::from_settings(&settings).is_ok());

        settings.separator = String::new();
        assert_eq!(
            StreamLayout::from_settings(&settings),
            Err(LayoutError::EmptySeparator)
        );

        settings.separator = " \n ".into();
        assert_eq!(
            StreamLayout::from_settings(&settings),
            Err(LayoutError::MultilineSeparator)
        );

        settings.separator = "   ".into();
        settings.timestamp_format = "%d %B".into();
        assert!(matches!(
            StreamLayout::from_settings(&settings),
            Err(LayoutError::InvalidFormat(FormatError::VariableWidth(_)))
        ));
    }

    #[test]
    fn separator_recognition_accepts_malformed_timestamps() {
        let layout = StreamLayout::default();
        assert!(layout.recognize("later   buy milk").is_some());
    }

    #[test]
    fn timestamp_recognition_requires_valid_timestamp() {
        let layout = StreamLayout {
            recognition: Recognition::Timestamp,
            ..StreamLayout::default()
        };
        assert!(layout.recognize("later   buy milk").is_none());
        assert!(layout.recognize("2023-01-01 10:00:00   ok").is_some());
        // The raw parser is unaffected by the policy
        assert!(layout.parse("later   buy milk").is_some());
    }

    #[test]
    fn thoughts_keep_line_numbers() {
        let lines = ["#stream", "2023-01-01 10:00:00   a", "prose", "2023-01-01 10:01:00   "];
        let found = StreamLayout::default().thoughts(&lines);
        let numbers: Vec<usize> = found.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(found[0].1.content, "a");
        assert_eq!(found[1].1.content, "");
    }
}
