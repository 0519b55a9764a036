use serde::Serialize;

use crate::model::thought::Thought;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ThoughtJson {
    /// One-based line number in the document
    pub line: usize,
    pub timestamp: String,
    pub valid: bool,
    pub content: String,
}

impl ThoughtJson {
    pub fn new(line: usize, thought: &Thought) -> Self {
        ThoughtJson {
            line: line + 1,
            timestamp: thought.timestamp_str.clone(),
            valid: thought.has_valid_timestamp(),
            content: thought.content.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct InitJson {
    pub path: String,
    pub tag: String,
    pub prompt: String,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// `  12  2024-06-01 09:00:00  content` (malformed timestamps marked with `?`)
pub fn format_thought(line: usize, thought: &Thought) -> String {
    let marker = if thought.has_valid_timestamp() { ' ' } else { '?' };
    format!(
        "{:>4}{} {}  {}",
        line + 1,
        marker,
        thought.timestamp_str,
        thought.content
    )
}

/// Human-readable `check` report, one finding per line
pub fn format_check_result(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            match err {
                CheckError::MalformedTimestamp { line, prefix } => {
                    lines.push(format!(
                        "  line {}: timestamp '{}' does not parse",
                        line + 1,
                        prefix
                    ));
                }
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warn in &result.warnings {
            match warn {
                CheckWarning::OutOfOrder {
                    line,
                    timestamp,
                    previous,
                } => {
                    lines.push(format!(
                        "  line {}: {} is earlier than the entry before it ({})",
                        line + 1,
                        timestamp,
                        previous
                    ));
                }
                CheckWarning::NoOpenPrompt { line } => {
                    lines.push(format!("  line {}: last line is not an open prompt", line + 1));
                }
                CheckWarning::MissingTag { tag } => {
                    lines.push(format!("  document is not tagged {}", tag));
                }
            }
        }
    }
    if result.valid {
        lines.push(format!("✓ stream is valid ({} entries)", result.entries));
    } else {
        lines.push("✗ stream has errors".to_string());
    }
    lines
}
