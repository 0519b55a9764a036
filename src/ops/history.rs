use serde::Serialize;

use crate::model::editor::Editor;
use crate::ops::gate::MarkdownEditor;
use crate::ops::layout::StreamLayout;
use crate::ops::regions::{IntegrityWarning, lock_timestamp_prefix};

/// What one history scan found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub lines_scanned: usize,
    /// Lines whose timestamp prefix is now locked
    pub recognized: Vec<usize>,
    /// Recognized lines whose timestamp string does not parse
    pub malformed: Vec<usize>,
    /// Separator-bearing lines left unlocked by timestamp recognition
    pub rejected: Vec<usize>,
    pub warnings: Vec<IntegrityWarning>,
}

/// Scan the whole document once, top to bottom, and lock the timestamp
/// prefix of every recognized stream line.
///
/// Unrecognized lines stay editable. Safe to run on every activation: each
/// lock clears the line's previous prefix mark before creating a new one.
pub fn initialize_history<E: Editor>(
    view: &mut MarkdownEditor<'_, E>,
    layout: &StreamLayout,
) -> InitReport {
    let editor = view.editor_mut();
    let mut report = InitReport {
        lines_scanned: editor.line_count(),
        ..Default::default()
    };

    for n in 0..editor.line_count() {
        let Some(line) = editor.line(n) else {
            continue;
        };
        let Some(thought) = layout.recognize(line) else {
            if layout.parse(line).is_some() {
                report.rejected.push(n);
            }
            continue;
        };
        if !thought.has_valid_timestamp() {
            report.malformed.push(n);
        }
        let prefix_len = thought.prefix_len(&layout.separator);
        if let Some(warning) = lock_timestamp_prefix(editor, n, prefix_len) {
            report.warnings.push(warning);
        }
        report.recognized.push(n);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::buffer::Buffer;
    use crate::model::config::Recognition;
    use crate::model::editor::ViewKind;
    use crate::model::position::Position;
    use crate::ops::regions::locked_prefix_ranges;

    fn init(buf: &mut Buffer, layout: &StreamLayout) -> InitReport {
        let mut view = MarkdownEditor::narrow(&ViewKind::Markdown, buf).unwrap();
        initialize_history(&mut view, layout)
    }

    #[test]
    fn locks_every_stamped_line() {
        let mut buf =
            Buffer::from_text("2023-01-01 10:00:00   first\n2023-01-01 10:05:00   ");
        let report = init(&mut buf, &StreamLayout::default());
        assert_eq!(report.recognized, vec![0, 1]);
        assert_eq!(
            locked_prefix_ranges(&buf),
            vec![
                (Position::new(0, 0), Position::new(0, 22)),
                (Position::new(1, 0), Position::new(1, 22)),
            ]
        );
        // Trailing empty content of the prompt line is editable
        buf.replace_range("next", Position::new(1, 22), Position::new(1, 22))
            .unwrap();
        assert_eq!(buf.line(1), Some("2023-01-01 10:05:00   next"));
    }

    #[test]
    fn free_form_lines_stay_editable() {
        let mut buf = Buffer::from_text("#stream\n\n2023-01-01 10:00:00   a\ncontinued");
        let report = init(&mut buf, &StreamLayout::default());
        assert_eq!(report.recognized, vec![2]);
        assert_eq!(report.lines_scanned, 4);
        assert!(!buf.is_read_only(Position::new(3, 0), Position::new(3, 9)));
        assert!(!buf.is_read_only(Position::new(0, 0), Position::new(0, 7)));
    }

    #[test]
    fn repeated_initialization_is_idempotent() {
        let mut buf = Buffer::from_text(
            "2023-01-01 10:00:00   a\nnote\n2023-01-01 10:01:00   b\n2023-01-01 10:02:00   ",
        );
        let layout = StreamLayout::default();
        init(&mut buf, &layout);
        let once = locked_prefix_ranges(&buf);
        let second = init(&mut buf, &layout);
        assert_eq!(locked_prefix_ranges(&buf), once);
        assert!(second.warnings.is_empty());
        assert_eq!(buf.all_marks().len(), 3);
    }

    #[test]
    fn malformed_timestamps_are_locked_but_reported() {
        let mut buf = Buffer::from_text("someday   maybe");
        let report = init(&mut buf, &StreamLayout::default());
        assert_eq!(report.recognized, vec![0]);
        assert_eq!(report.malformed, vec![0]);
        assert_eq!(
            locked_prefix_ranges(&buf),
            vec![(Position::new(0, 0), Position::new(0, 10))]
        );
    }

    #[test]
    fn strict_recognition_skips_malformed_lines() {
        let mut buf = Buffer::from_text("someday   maybe\n2023-01-01 10:00:00   ok");
        let layout = StreamLayout {
            recognition: Recognition::Timestamp,
            ..StreamLayout::default()
        };
        let report = init(&mut buf, &layout);
        assert_eq!(report.recognized, vec![1]);
        assert!(report.malformed.is_empty());
        assert_eq!(report.rejected, vec![0]);
    }

    #[test]
    fn stacked_marks_from_earlier_runs_are_reported() {
        let mut buf = Buffer::from_text("2023-01-01 10:00:00   a");
        buf.mark_text(
            Position::new(0, 0),
            Position::new(0, 22),
            crate::model::mark::MarkOptions::timestamp(),
        );
        buf.mark_text(
            Position::new(0, 0),
            Position::new(0, 22),
            crate::model::mark::MarkOptions::timestamp(),
        );
        let report = init(&mut buf, &StreamLayout::default());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(buf.all_marks().len(), 1);
    }
}
