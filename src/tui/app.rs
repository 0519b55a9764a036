use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::diagnostics::{
    DiagnosticCategory, DiagnosticEntry, log_diagnostic, log_init_report, log_integrity_warnings,
};
use crate::io::document_io::{StreamDocument, load_document, save_document};
use crate::io::lock::FileLock;
use crate::io::watcher::{DocumentWatcher, FileEvent};
use crate::model::config::UiConfig;
use crate::model::editor::{EditError, Editor, ViewKind};
use crate::ops::stream::{CommandError, SUBMIT_THOUGHT, ThoughtStream};
use crate::parse::tags::normalize_tag;

use super::input;
use super::render;
use super::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

/// One-line message shown in the status row until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

/// Main application state: one stream document in one editor view
pub struct App {
    pub doc: StreamDocument,
    pub stream: ThoughtStream,
    pub theme: Theme,
    pub show_key_hints: bool,
    /// Whether the last activation passed the gate
    pub active: bool,
    pub status: Option<StatusMessage>,
    /// First visible line
    pub scroll: usize,
    /// First visible display column
    pub h_scroll: usize,
    /// Rows of document text on screen, as of the last render
    pub view_height: usize,
    /// Unsaved edits in the buffer
    pub dirty: bool,
    pub should_quit: bool,
    pub log_path: PathBuf,
}

impl App {
    pub fn new(doc: StreamDocument, stream: ThoughtStream, ui: &UiConfig, log_path: PathBuf) -> Self {
        let mut app = App {
            doc,
            stream,
            theme: Theme::from_config(ui),
            show_key_hints: ui.show_key_hints,
            active: false,
            status: None,
            scroll: 0,
            h_scroll: 0,
            view_height: 0,
            dirty: false,
            should_quit: false,
            log_path,
        };
        app.activate();
        // Start on the open prompt
        let last = app.doc.buffer.last_line();
        let end = app.doc.buffer.end_of_line(last);
        app.doc.buffer.set_cursor(end);
        app
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    /// Run the gate and then the history initializer on the buffer.
    pub fn activate(&mut self) {
        match self.stream.on_document_open(Some(self.doc.active())) {
            Some(report) => {
                self.active = true;
                log_init_report(&self.log_path, &self.doc.path, self.doc.buffer.lines(), &report);
                let flagged = report.malformed.len() + report.rejected.len() + report.warnings.len();
                if flagged > 0 {
                    self.set_status(
                        StatusKind::Warning,
                        format!("{} line(s) need attention, see `tstream diagnostics`", flagged),
                    );
                }
            }
            None => {
                self.active = false;
                let text = if self.doc.view_kind() != ViewKind::Markdown {
                    "not a markdown document, stream inactive".to_string()
                } else {
                    format!("not tagged {}, stream inactive", normalize_tag(self.stream.tag()))
                };
                self.set_status(StatusKind::Warning, text);
            }
        }
    }

    /// Dispatch `submit-thought` against the open document.
    pub fn submit(&mut self) {
        match self.stream.dispatch(SUBMIT_THOUGHT.id, Some(self.doc.active())) {
            Ok(outcome) => {
                log_integrity_warnings(&self.log_path, &self.doc.path, &outcome.warnings);
                self.dirty = true;
                self.h_scroll = 0;
                self.set_status(StatusKind::Info, format!("committed at {}", outcome.timestamp));
            }
            Err(CommandError::Precondition(e)) => {
                log_diagnostic(
                    &self.log_path,
                    DiagnosticEntry::new(DiagnosticCategory::Precondition, e.to_string())
                        .field("Document", self.doc.path.display().to_string())
                        .field("Command", SUBMIT_THOUGHT.id),
                );
                self.set_status(StatusKind::Error, e.to_string());
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    /// Report an edit the buffer refused.
    pub fn refuse_edit(&mut self, err: EditError) {
        match err {
            EditError::ReadOnly { .. } => {
                self.set_status(StatusKind::Warning, "locked text is read-only")
            }
            EditError::OutOfRange(_) => self.set_status(StatusKind::Error, err.to_string()),
        }
    }

    /// Write the buffer to disk under the document lock.
    pub fn save(&mut self) -> bool {
        let result = match FileLock::acquire_default(&self.doc.path) {
            Ok(_lock) => save_document(&self.doc, Some(&self.log_path)).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => {
                self.dirty = false;
                self.set_status(StatusKind::Info, "saved");
                true
            }
            Err(e) => {
                self.set_status(StatusKind::Error, e);
                false
            }
        }
    }

    /// Save (when dirty) and leave. A failed save keeps the editor open.
    pub fn quit(&mut self) {
        if !self.dirty || self.save() {
            self.should_quit = true;
        }
    }

    /// The document changed on disk: reload it unless there are unsaved
    /// edits, then re-activate.
    pub fn on_file_changed(&mut self) {
        let Ok(disk) = fs::read_to_string(&self.doc.path) else {
            return;
        };
        // Our own save
        if disk == self.doc.to_text() {
            return;
        }
        if self.dirty {
            self.activate();
            self.set_status(
                StatusKind::Warning,
                "document changed on disk, saving will overwrite it",
            );
            return;
        }

        let cursor = self.doc.buffer.cursor();
        let path = self.doc.path.clone();
        self.doc = StreamDocument::from_text(&path, &disk);
        self.doc.buffer.set_cursor(cursor);
        self.status = None;
        self.activate();
        if self.status.is_none() {
            self.set_status(StatusKind::Info, "reloaded from disk");
        }
    }

    /// Keep the cursor inside a `height` x `width` viewport.
    pub fn scroll_to_cursor(&mut self, height: usize, width: usize) {
        let cursor = self.doc.buffer.cursor();
        if cursor.line < self.scroll {
            self.scroll = cursor.line;
        } else if height > 0 && cursor.line >= self.scroll + height {
            self.scroll = cursor.line + 1 - height;
        }

        let line = self.doc.buffer.line(cursor.line).unwrap_or_default();
        let col = crate::util::unicode::char_to_display_col(line, cursor.ch);
        if col < self.h_scroll {
            self.h_scroll = col;
        } else if width > 0 && col >= self.h_scroll + width {
            self.h_scroll = col + 1 - width;
        }
    }
}

pub fn run(
    path: &Path,
    stream: ThoughtStream,
    ui: &UiConfig,
    log_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_document(path)?;
    let mut app = App::new(doc, stream, ui, log_path.to_path_buf());

    let watcher = if ui.watch {
        DocumentWatcher::start(path).ok()
    } else {
        None
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&DocumentWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        if let Some(w) = watcher
            && w.poll().iter().any(|e| matches!(e, FileEvent::Changed(_)))
        {
            app.on_file_changed();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
