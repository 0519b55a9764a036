use crate::model::editor::{Editor, ViewKind};
use crate::parse::tags::normalize_tag;

/// Error type for host actions invoked in the wrong context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("no active document")]
    NoActiveDocument,
    #[error("view '{view}' is not a markdown view")]
    NotMarkdown { view: String },
}

/// The document the host currently shows, handed to the stream per event.
pub struct ActiveDocument<'a, E: Editor> {
    /// Tags from the host's metadata index, each with its leading `#`
    pub tags: Vec<String>,
    pub view: ViewKind,
    pub editor: &'a mut E,
}

impl<'a, E: Editor> ActiveDocument<'a, E> {
    pub fn new(tags: Vec<String>, view: ViewKind, editor: &'a mut E) -> Self {
        ActiveDocument { tags, view, editor }
    }

    /// A markdown document with the given tags
    pub fn markdown(tags: Vec<String>, editor: &'a mut E) -> Self {
        ActiveDocument::new(tags, ViewKind::Markdown, editor)
    }
}

/// An editor known to back a markdown view.
///
/// Obtained once from [`MarkdownEditor::narrow`] or [`activate`]; the
/// initializer and controller only accept this handle.
pub struct MarkdownEditor<'a, E: Editor> {
    editor: &'a mut E,
}

impl<'a, E: Editor> MarkdownEditor<'a, E> {
    pub fn narrow(view: &ViewKind, editor: &'a mut E) -> Result<Self, PreconditionViolation> {
        match view {
            ViewKind::Markdown => Ok(MarkdownEditor { editor }),
            other => Err(PreconditionViolation::NotMarkdown {
                view: other.to_string(),
            }),
        }
    }

    pub fn editor(&self) -> &E {
        self.editor
    }

    pub fn editor_mut(&mut self) -> &mut E {
        self.editor
    }
}

/// Whether `tags` contains `tag` (normalized to a leading `#`). Exact match only.
pub fn is_tagged(tags: &[String], tag: &str) -> bool {
    let wanted = normalize_tag(tag);
    tags.iter().any(|t| *t == wanted)
}

/// Whether the stream applies to the active document. No document means no.
pub fn should_activate(tags: Option<&[String]>, tag: &str) -> bool {
    tags.is_some_and(|tags| is_tagged(tags, tag))
}

/// Run the gate: the active document must carry `tag` and be shown in a
/// markdown view. Returns the typed handle, or `None` when the stream does
/// not apply.
pub fn activate<'a, E: Editor>(
    active: Option<ActiveDocument<'a, E>>,
    tag: &str,
) -> Option<MarkdownEditor<'a, E>> {
    let doc = active?;
    if !should_activate(Some(&doc.tags), tag) {
        return None;
    }
    MarkdownEditor::narrow(&doc.view, doc.editor).ok()
}
