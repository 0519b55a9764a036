use chrono::NaiveDateTime;
use serde::Serialize;

use crate::ops::gate::is_tagged;
use crate::ops::layout::StreamLayout;

/// Structured result from `tstream check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    /// Lines with a valid timestamp prefix
    pub entries: usize,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A line contains the separator but the text before it is not a timestamp
    #[serde(rename = "malformed_timestamp")]
    MalformedTimestamp { line: usize, prefix: String },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// An entry is older than the entry before it
    #[serde(rename = "out_of_order")]
    OutOfOrder {
        line: usize,
        timestamp: String,
        previous: String,
    },
    /// The last line is not an open prompt, so the next commit will prepend
    #[serde(rename = "no_open_prompt")]
    NoOpenPrompt { line: usize },
    /// The document does not carry the activation tag
    #[serde(rename = "missing_tag")]
    MissingTag { tag: String },
}

/// Validate a stream document and return structured results.
///
/// Read-only. Line numbers in the result are zero-based.
pub fn check_stream<S: AsRef<str>>(
    lines: &[S],
    tags: &[String],
    layout: &StreamLayout,
    tag: &str,
) -> CheckResult {
    let mut result = CheckResult::default();

    if !is_tagged(tags, tag) {
        result.warnings.push(CheckWarning::MissingTag {
            tag: tag.to_string(),
        });
    }

    let mut previous: Option<(NaiveDateTime, String)> = None;
    for (n, line) in lines.iter().enumerate() {
        let Some(thought) = layout.parse(line.as_ref()) else {
            continue;
        };
        let Some(ts) = thought.timestamp else {
            result.errors.push(CheckError::MalformedTimestamp {
                line: n,
                prefix: thought.timestamp_str,
            });
            continue;
        };
        result.entries += 1;
        if let Some((prev, prev_str)) = &previous {
            if ts < *prev {
                result.warnings.push(CheckWarning::OutOfOrder {
                    line: n,
                    timestamp: thought.timestamp_str.clone(),
                    previous: prev_str.clone(),
                });
            }
        }
        previous = Some((ts, thought.timestamp_str));
    }

    let last = lines.len().saturating_sub(1);
    let open = lines
        .last()
        .and_then(|l| layout.parse(l.as_ref()))
        .is_some_and(|t| t.has_valid_timestamp());
    if !open {
        result.warnings.push(CheckWarning::NoOpenPrompt { line: last });
    }

    result.valid = result.errors.is_empty();
    result
}
