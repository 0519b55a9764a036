use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::config::LockScope;
use crate::model::editor::{EditError, Editor};
use crate::model::mark::TIMESTAMP_CLASS;
use crate::model::position::Position;
use crate::ops::gate::MarkdownEditor;
use crate::ops::layout::StreamLayout;
use crate::ops::regions::{
    IntegrityWarning, append_line_after, clear_line_marks, is_line_locked, lock_timestamp_prefix,
    lock_whole_line,
};

/// Error type for the commit action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("cannot edit the stream: {0}")]
    Edit(#[from] EditError),
}

/// Result of one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    /// Line that was stamped and locked (or found already locked)
    pub committed_line: usize,
    /// False when the last line was already locked and only a prompt was added
    pub stamped: bool,
    /// True when an existing timestamp prefix was replaced rather than prepended
    pub replaced_prefix: bool,
    /// The new open line
    pub prompt_line: usize,
    pub timestamp: String,
    pub warnings: Vec<IntegrityWarning>,
}

/// Commit the open line at `instant` and open a new prompt below it.
///
/// 1. Stamp: the last line gets a fresh timestamp prefix (replacing a valid
///    old one, otherwise prepended so no text is lost) and the prefix is
///    re-locked.
/// 2. New prompt: `"\n" + timestamp + separator` is appended, its prefix is
///    locked and the cursor moves to its end.
/// 3. Under [`LockScope::Line`] the stamped line is locked whole. This comes
///    last because a whole-line lock refuses the prompt's insertion at its end.
///
/// If the last line is already fully locked (a previous commit stopped after
/// locking it), only step 2 runs.
pub fn submit_at<E: Editor>(
    view: &mut MarkdownEditor<'_, E>,
    layout: &StreamLayout,
    instant: NaiveDateTime,
) -> Result<SubmitOutcome, SubmitError> {
    let editor = view.editor_mut();
    let line = editor.last_line();
    let timestamp = layout.codec.format(instant);
    let mut warnings = Vec::new();

    let stamped = !is_line_locked(editor, line);
    let replaced_prefix = if stamped {
        stamp(editor, line, layout, &timestamp, &mut warnings)?
    } else {
        false
    };

    let prompt_line = new_prompt(editor, line, layout, &timestamp, &mut warnings)?;

    if stamped && layout.lock_scope == LockScope::Line {
        warnings.extend(lock_whole_line(editor, line));
    }

    Ok(SubmitOutcome {
        committed_line: line,
        stamped,
        replaced_prefix,
        prompt_line,
        timestamp,
        warnings,
    })
}

/// Type `text` at the end of the open line, as a user would.
///
/// The open line is the last line when it is empty or an unlocked prompt.
/// Otherwise the text starts a new line below it. Line breaks in `text`
/// become spaces.
pub fn type_into_open_line<E: Editor>(
    view: &mut MarkdownEditor<'_, E>,
    layout: &StreamLayout,
    text: &str,
) -> Result<(), EditError> {
    let editor = view.editor_mut();
    let line = editor.last_line();
    let current = editor.line(line).unwrap_or_default();
    let prompt = layout.parse(current).filter(|t| t.has_valid_timestamp());
    let open = !is_line_locked(editor, line) && (current.is_empty() || prompt.is_some());

    let text = text.replace(['\r', '\n'], " ");
    if !open {
        return append_line_after(editor, line, &text).map(|_| ());
    }
    let insert = match prompt {
        Some(t) if !t.content.is_empty() && !t.content.ends_with(' ') => format!(" {}", text),
        _ => text,
    };
    let eol = editor.end_of_line(line);
    editor.replace_range(&insert, eol, eol)
}

/// Returns whether an existing prefix was replaced.
fn stamp<E: Editor>(
    editor: &mut E,
    line: usize,
    layout: &StreamLayout,
    timestamp: &str,
    warnings: &mut Vec<IntegrityWarning>,
) -> Result<bool, SubmitError> {
    warnings.extend(clear_line_marks(editor, line, TIMESTAMP_CLASS));

    let old_prefix_len = editor
        .line(line)
        .and_then(|text| layout.parse(text))
        .filter(|thought| thought.has_valid_timestamp())
        .map(|thought| thought.prefix_len(&layout.separator));

    let prefix = layout.prefix(timestamp);
    let start = Position::line_start(line);
    let end = Position::new(line, old_prefix_len.unwrap_or(0));
    editor.replace_range(&prefix, start, end)?;

    warnings.extend(lock_timestamp_prefix(
        editor,
        line,
        prefix.chars().count(),
    ));
    Ok(old_prefix_len.is_some())
}

/// Returns the new prompt line.
fn new_prompt<E: Editor>(
    editor: &mut E,
    line: usize,
    layout: &StreamLayout,
    timestamp: &str,
    warnings: &mut Vec<IntegrityWarning>,
) -> Result<usize, SubmitError> {
    let prefix = layout.prefix(timestamp);
    warnings.extend(append_line_after(editor, line, &prefix)?);

    let prompt_line = line + 1;
    warnings.extend(lock_timestamp_prefix(
        editor,
        prompt_line,
        prefix.chars().count(),
    ));
    let end = editor.end_of_line(prompt_line);
    editor.set_cursor(end);
    Ok(prompt_line)
}
