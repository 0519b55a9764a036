use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

use crate::model::config::DEFAULT_TIMESTAMP_FORMAT;

/// Why a chrono format string cannot drive the stream
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("timestamp format cannot be empty")]
    Empty,
    #[error("invalid timestamp format '{0}'")]
    Malformed(String),
    #[error("timestamp format '{0}' is not fixed-width")]
    VariableWidth(String),
    #[error("timestamp format '{0}' does not round-trip a full date and time")]
    Incomplete(String),
}

/// Fixed-format timestamp codec at one-second resolution.
///
/// `parse` only accepts strings that `format` would produce exactly, so
/// `format(parse(s)) == s` for every accepted `s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampCodec {
    format: String,
}

impl Default for TimestampCodec {
    fn default() -> Self {
        TimestampCodec {
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl TimestampCodec {
    /// Build a codec, rejecting formats that are malformed or not fixed-width.
    pub fn new(format: &str) -> Result<Self, FormatError> {
        validate_format(format)?;
        Ok(TimestampCodec {
            format: format.to_string(),
        })
    }

    /// Render `instant`. Sub-second precision is dropped.
    pub fn format(&self, instant: NaiveDateTime) -> String {
        let instant = truncate_to_second(instant);
        let mut out = String::new();
        if write!(out, "{}", instant.format(&self.format)).is_err() {
            out.clear();
            let _ = write!(out, "{}", instant.format(DEFAULT_TIMESTAMP_FORMAT));
        }
        out
    }

    /// Parse a timestamp string. `None` signals a parse mismatch.
    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        let parsed = NaiveDateTime::parse_from_str(s, &self.format).ok()?;
        // chrono accepts unpadded fields; recognition requires the exact rendering
        if self.format(parsed) != s {
            return None;
        }
        Some(parsed)
    }

    /// Character width of every string this codec renders
    pub fn width(&self) -> usize {
        self.format(sample_instant()).chars().count()
    }
}

/// Current local wall-clock time, truncated to the second
pub fn now() -> NaiveDateTime {
    truncate_to_second(Local::now().naive_local())
}

pub fn truncate_to_second(instant: NaiveDateTime) -> NaiveDateTime {
    instant.with_nanosecond(0).unwrap_or(instant)
}

fn sample_instant() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2001, 2, 3)
        .and_then(|d| d.and_hms_opt(4, 5, 6))
        .unwrap_or_default()
}

fn late_sample_instant() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 28)
        .and_then(|d| d.and_hms_opt(23, 59, 58))
        .unwrap_or_default()
}

/// Check that a chrono format string is well-formed, renders at fixed width,
/// and carries enough fields to parse back to a full date and time.
pub fn validate_format(format: &str) -> Result<(), FormatError> {
    if format.is_empty() {
        return Err(FormatError::Empty);
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::Malformed(format.to_string()));
    }
    let mut early = String::new();
    let mut late = String::new();
    if write!(early, "{}", sample_instant().format(format)).is_err()
        || write!(late, "{}", late_sample_instant().format(format)).is_err()
    {
        return Err(FormatError::Malformed(format.to_string()));
    }
    if early.chars().count() != late.chars().count() {
        return Err(FormatError::VariableWidth(format.to_string()));
    }
    if NaiveDateTime::parse_from_str(&late, format).ok() != Some(late_sample_instant()) {
        return Err(FormatError::Incomplete(format.to_string()));
    }
    Ok(())
}
