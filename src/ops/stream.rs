use chrono::NaiveDateTime;

use crate::model::config::StreamSettings;
use crate::model::editor::Editor;
use crate::ops::gate::{ActiveDocument, MarkdownEditor, PreconditionViolation, activate};
use crate::ops::history::{InitReport, initialize_history};
use crate::ops::layout::{LayoutError, StreamLayout};
use crate::ops::submit::{SubmitError, SubmitOutcome, submit_at, type_into_open_line};
use crate::parse::timestamp;

/// A key binding suggested to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub key: &'static str,
    pub modifiers: &'static [&'static str],
}

/// A user-invocable action the stream registers with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub hotkey: Hotkey,
}

pub const SUBMIT_THOUGHT: CommandInfo = CommandInfo {
    id: "submit-thought",
    name: "Submit thought",
    hotkey: Hotkey {
        key: "Enter",
        modifiers: &["Alt"],
    },
};

const COMMANDS: &[CommandInfo] = &[SUBMIT_THOUGHT];

/// Error type for host command dispatch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// The thought stream as the host sees it: lifecycle hooks and one command.
///
/// Holds no editor. Every entry point receives the active document from the
/// host, so a stale handle can never be edited.
#[derive(Debug, Clone)]
pub struct ThoughtStream {
    settings: StreamSettings,
    layout: StreamLayout,
}

impl ThoughtStream {
    pub fn new(settings: StreamSettings) -> Result<Self, LayoutError> {
        let layout = StreamLayout::from_settings(&settings)?;
        Ok(ThoughtStream { settings, layout })
    }

    pub fn layout(&self) -> &StreamLayout {
        &self.layout
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn tag(&self) -> &str {
        &self.settings.tag
    }

    /// Commands to register with the host
    pub fn commands() -> &'static [CommandInfo] {
        COMMANDS
    }

    /// Lifecycle hook: a document was opened or regained focus.
    ///
    /// Initializes the history when the gate passes; returns `None` when the
    /// stream does not apply to the document.
    pub fn on_document_open<E: Editor>(
        &self,
        active: Option<ActiveDocument<'_, E>>,
    ) -> Option<InitReport> {
        let mut view = activate(active, &self.settings.tag)?;
        Some(initialize_history(&mut view, &self.layout))
    }

    /// The `submit-thought` command, stamped with the current wall-clock time.
    pub fn submit_thought<E: Editor>(
        &self,
        active: Option<ActiveDocument<'_, E>>,
    ) -> Result<SubmitOutcome, CommandError> {
        self.submit_thought_at(active, timestamp::now())
    }

    pub fn submit_thought_at<E: Editor>(
        &self,
        active: Option<ActiveDocument<'_, E>>,
        instant: NaiveDateTime,
    ) -> Result<SubmitOutcome, CommandError> {
        let doc = active.ok_or(PreconditionViolation::NoActiveDocument)?;
        let mut view = MarkdownEditor::narrow(&doc.view, doc.editor)?;
        Ok(submit_at(&mut view, &self.layout, instant)?)
    }

    /// Type `text` into the open line and commit it in one step.
    pub fn add_thought_at<E: Editor>(
        &self,
        active: Option<ActiveDocument<'_, E>>,
        text: &str,
        instant: NaiveDateTime,
    ) -> Result<SubmitOutcome, CommandError> {
        let doc = active.ok_or(PreconditionViolation::NoActiveDocument)?;
        let mut view = MarkdownEditor::narrow(&doc.view, doc.editor)?;
        type_into_open_line(&mut view, &self.layout, text).map_err(SubmitError::from)?;
        Ok(submit_at(&mut view, &self.layout, instant)?)
    }

    /// Dispatch a registered command by id
    pub fn dispatch<E: Editor>(
        &self,
        command_id: &str,
        active: Option<ActiveDocument<'_, E>>,
    ) -> Result<SubmitOutcome, CommandError> {
        if command_id == SUBMIT_THOUGHT.id {
            self.submit_thought(active)
        } else {
            Err(CommandError::UnknownCommand(command_id.to_string()))
        }
    }
}
