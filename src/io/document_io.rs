use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::io::diagnostics::{DiagnosticCategory, DiagnosticEntry, log_diagnostic};
use crate::model::buffer::Buffer;
use crate::model::editor::ViewKind;
use crate::ops::gate::{ActiveDocument, is_tagged};
use crate::parse::tags::{extract_tags, normalize_tag};

/// Error type for document I/O
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("no such document: {0}")]
    NotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("{path} is not a thought stream (missing tag {tag})")]
    NotAStream { path: PathBuf, tag: String },
}

/// A stream document loaded from disk: the editable buffer plus the file's
/// line-ending conventions, restored on save.
#[derive(Debug, Clone)]
pub struct StreamDocument {
    pub path: PathBuf,
    pub buffer: Buffer,
    pub trailing_newline: bool,
    pub crlf: bool,
}

impl StreamDocument {
    /// Build from raw file text. A final newline is not materialized as an
    /// extra empty line.
    pub fn from_text(path: &Path, text: &str) -> Self {
        let crlf = text.contains("\r\n");
        let (body, trailing_newline) = match text.strip_suffix('\n') {
            Some(rest) => (rest.strip_suffix('\r').unwrap_or(rest), true),
            None => (text, false),
        };
        StreamDocument {
            path: path.to_path_buf(),
            buffer: Buffer::from_text(body),
            trailing_newline,
            crlf,
        }
    }

    /// The file text, with the original line endings.
    pub fn to_text(&self) -> String {
        let eol = if self.crlf { "\r\n" } else { "\n" };
        let mut text = self.buffer.lines().join(eol);
        if self.trailing_newline {
            text.push_str(eol);
        }
        text
    }

    /// Tags from front matter and inline `#tag`s, each with its leading `#`
    pub fn tags(&self) -> Vec<String> {
        extract_tags(&self.buffer.text())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        is_tagged(&self.tags(), tag)
    }

    /// Markdown for `.md`/`.markdown` files, otherwise the extension
    pub fn view_kind(&self) -> ViewKind {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown") => {
                ViewKind::Markdown
            }
            Some(ext) => ViewKind::Other(ext.to_string()),
            None => ViewKind::Other(String::new()),
        }
    }

    /// Hand this document to the stream as the active document.
    pub fn active(&mut self) -> ActiveDocument<'_, Buffer> {
        let tags = self.tags();
        let view = self.view_kind();
        ActiveDocument::new(tags, view, &mut self.buffer)
    }

    /// Fail with `NotAStream` unless the document carries `tag`.
    pub fn require_tag(&self, tag: &str) -> Result<(), DocumentError> {
        if self.has_tag(tag) {
            Ok(())
        } else {
            Err(DocumentError::NotAStream {
                path: self.path.clone(),
                tag: normalize_tag(tag),
            })
        }
    }
}

/// Load a stream document from `path`.
pub fn load_document(path: &Path) -> Result<StreamDocument, DocumentError> {
    if !path.exists() {
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| DocumentError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(StreamDocument::from_text(path, &text))
}

/// Save a document atomically. On failure the unsaved text is written to the
/// diagnostics log at `log_path`, when one is given.
pub fn save_document(doc: &StreamDocument, log_path: Option<&Path>) -> Result<(), DocumentError> {
    let content = doc.to_text();
    if let Err(e) = atomic_write(&doc.path, content.as_bytes()) {
        if let Some(log_path) = log_path {
            log_diagnostic(
                log_path,
                DiagnosticEntry::new(DiagnosticCategory::Write, "document write failed")
                    .field("Target", doc.path.display().to_string())
                    .field("Error", e.to_string())
                    .body(content),
            );
        }
        return Err(DocumentError::WriteError {
            path: doc.path.clone(),
            source: e,
        });
    }
    Ok(())
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
