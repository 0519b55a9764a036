use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::model::config::StreamConfig;
use crate::ops::history::InitReport;
use crate::ops::regions::IntegrityWarning;

/// Maximum size of the diagnostics log before inline trimming (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Default number of days before entries are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

/// Self-documenting header written at the top of a new diagnostics log.
const FILE_HEADER: &str = "\
<!-- thought-stream diagnostics log: append-only
     Integrity repairs, unparseable timestamps and text that could not be
     saved end up here.
     View with: tstream diagnostics
     Prune old entries: tstream diagnostics prune
     Safe to delete if empty or stale. -->

---
";

/// Category of a diagnostics entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    /// Duplicate marks found and cleared on one line
    Integrity,
    /// A separator-bearing line whose timestamp does not parse
    Parse,
    /// A document save failed; the body holds the unsaved text
    Write,
    /// A command ran without a usable document
    Precondition,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Integrity => write!(f, "integrity"),
            DiagnosticCategory::Parse => write!(f, "parse"),
            DiagnosticCategory::Write => write!(f, "write"),
            DiagnosticCategory::Precondition => write!(f, "precondition"),
        }
    }
}

impl DiagnosticCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "integrity" => Some(DiagnosticCategory::Integrity),
            "parse" => Some(DiagnosticCategory::Parse),
            "write" => Some(DiagnosticCategory::Write),
            "precondition" => Some(DiagnosticCategory::Precondition),
            _ => None,
        }
    }
}

/// A single entry in the diagnostics log.
#[derive(Debug, Clone)]
pub struct DiagnosticEntry {
    pub timestamp: DateTime<Utc>,
    pub category: DiagnosticCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl DiagnosticEntry {
    pub fn new(category: DiagnosticCategory, description: impl Into<String>) -> Self {
        DiagnosticEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Where the diagnostics log lives: `[diagnostics].path`, or next to the
/// config file.
pub fn diagnostics_log_path(config: &StreamConfig, config_path: &Path) -> PathBuf {
    if let Some(path) = &config.diagnostics.path {
        return PathBuf::from(path);
    }
    config_path
        .parent()
        .unwrap_or(Path::new("."))
        .join("diagnostics.log")
}

impl DiagnosticEntry {
    /// Format this entry as a markdown block for the log.
    fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "## {} — {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push('\n');
            out.push_str("```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }

    /// Serialize to JSON value for `tstream diagnostics --json`.
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }

    /// Format as human-readable raw markdown for display.
    pub fn to_display_markdown(&self) -> String {
        self.to_markdown()
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append an entry to the log. Errors are swallowed and printed to stderr.
pub fn log_diagnostic(log_path: &Path, entry: DiagnosticEntry) {
    if let Err(e) = log_diagnostic_inner(log_path, entry) {
        eprintln!("warning: could not write to diagnostics log: {}", e);
    }
}

fn log_diagnostic_inner(log_path: &Path, entry: DiagnosticEntry) -> io::Result<()> {
    if let Some(dir) = log_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    if let Ok(meta) = std::fs::metadata(log_path)
        && meta.len() > MAX_LOG_SIZE
    {
        try_inline_trim(log_path);
    }

    let needs_header = std::fs::metadata(log_path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())?;
    Ok(())
}

/// Record mark repairs reported by the initializer or a commit.
pub fn log_integrity_warnings(log_path: &Path, document: &Path, warnings: &[IntegrityWarning]) {
    for warning in warnings {
        log_diagnostic(
            log_path,
            DiagnosticEntry::new(DiagnosticCategory::Integrity, "duplicate marks cleared")
                .field("Document", document.display().to_string())
                .field("Line", (warning.line + 1).to_string())
                .field("Class", warning.class.clone())
                .field("Found", warning.found.to_string()),
        );
    }
}

/// Log what an activation found: repaired marks, then each separator-bearing
/// line whose timestamp did not parse.
pub fn log_init_report(log_path: &Path, document: &Path, lines: &[String], report: &InitReport) {
    log_integrity_warnings(log_path, document, &report.warnings);
    let mut flagged: Vec<usize> = report.malformed.iter().chain(&report.rejected).copied().collect();
    flagged.sort_unstable();
    for n in flagged {
        log_diagnostic(
            log_path,
            DiagnosticEntry::new(DiagnosticCategory::Parse, "timestamp did not parse")
                .field("Document", document.display().to_string())
                .field("Line", (n + 1).to_string())
                .body(lines.get(n).cloned().unwrap_or_default()),
        );
    }
}

/// Trim old entries when the log exceeds MAX_LOG_SIZE.
/// Skips silently if another process holds the log.
fn try_inline_trim(path: &Path) {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => f,
        Err(_) => return,
    };
    if try_flock(&file).is_err() {
        return;
    }

    let mut content = String::new();
    let mut reader = io::BufReader::new(&file);
    if reader.read_to_string(&mut content).is_err() {
        return;
    }

    let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
    let trimmed = prune_entries_before(&content, &cutoff);
    if trimmed.len() < content.len() {
        if let Ok(mut f) = File::create(path) {
            let _ = f.write_all(trimmed.as_bytes());
        }
    }
}

#[cfg(unix)]
fn try_flock(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if ret == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> io::Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read entries from the log, most recent first.
pub fn read_diagnostics(
    log_path: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<DiagnosticEntry> {
    let content = match std::fs::read_to_string(log_path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(since_dt) = since {
        entries.retain(|e| e.timestamp >= since_dt);
    }
    if let Some(n) = limit {
        let skip = entries.len().saturating_sub(n);
        entries = entries.into_iter().skip(skip).collect();
    }
    entries.reverse();
    entries
}

fn parse_entries(content: &str) -> Vec<DiagnosticEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(header) = line.strip_prefix("## ") else {
            continue;
        };
        let Some((timestamp, category, description)) = parse_entry_header(header) else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body = String::new();
        let mut in_code_block = false;

        for line in lines.by_ref() {
            if !in_code_block && (line == "---" || line.starts_with("## ")) {
                break;
            }
            if in_code_block {
                if line == "```" {
                    in_code_block = false;
                } else {
                    if !body.is_empty() {
                        body.push('\n');
                    }
                    body.push_str(line);
                }
                continue;
            }
            if line.starts_with("```") {
                in_code_block = true;
                continue;
            }
            let trimmed = line.trim();
            if let Some((key, value)) = trimmed.split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(DiagnosticEntry {
            timestamp,
            category,
            description,
            fields,
            body,
        });
    }

    entries
}

/// Parse an entry header: `<timestamp> — <category>: <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, DiagnosticCategory, String)> {
    let (timestamp_str, rest) = header.split_once(" — ")?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let (category_str, description) = rest.split_once(": ")?;
    let category = DiagnosticCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Prune entries from the log. Returns the number of entries removed.
pub fn prune_diagnostics(
    log_path: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    if !log_path.exists() {
        return Ok(0);
    }

    let file = OpenOptions::new().read(true).write(true).open(log_path)?;
    let mut locked = false;
    for _ in 0..10 {
        if try_flock(&file).is_ok() {
            locked = true;
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    if !locked {
        return Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "diagnostics log is in use, try again later",
        ));
    }

    let content = std::fs::read_to_string(log_path)?;
    let original_count = parse_entries(&content).len();

    if all {
        std::fs::write(log_path, FILE_HEADER)?;
        return Ok(original_count);
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let trimmed = prune_entries_before(&content, &cutoff);
    let new_count = parse_entries(&trimmed).len();
    std::fs::write(log_path, &trimmed)?;
    Ok(original_count - new_count)
}

/// Remove entries with timestamps before `cutoff`, keeping the file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    let mut result = String::new();
    let mut current_entry = String::new();
    let mut current_timestamp: Option<DateTime<Utc>> = None;
    let mut in_header = true;

    for line in content.lines() {
        if in_header {
            result.push_str(line);
            result.push('\n');
            if line == "---" {
                in_header = false;
            }
            continue;
        }

        if let Some(stripped) = line.strip_prefix("## ") {
            if current_timestamp.is_some_and(|ts| ts >= *cutoff) {
                result.push_str(&current_entry);
            }
            current_entry.clear();
            current_timestamp = parse_entry_header(stripped).map(|(ts, _, _)| ts);
        }
        current_entry.push_str(line);
        current_entry.push('\n');
    }

    if current_timestamp.is_some_and(|ts| ts >= *cutoff) {
        result.push_str(&current_entry);
    }

    result
}
