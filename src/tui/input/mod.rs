mod edit;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::stream::{Hotkey, SUBMIT_THOUGHT, ThoughtStream};

use super::app::App;

use edit::{handle_edit, insert_text};
use navigate::handle_navigate;

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status = None;

    // Registered stream commands take precedence over editing
    if let Some(cmd) = ThoughtStream::commands()
        .iter()
        .find(|cmd| matches_hotkey(&key, &cmd.hotkey))
    {
        run_command(app, cmd.id);
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => {
            app.save();
        }
        KeyCode::Char('q') if ctrl => app.quit(),
        KeyCode::Esc => app.quit(),
        _ => {
            if !handle_edit(app, key) {
                handle_navigate(app, key);
            }
        }
    }
}

/// Handle a bracketed paste event (terminal sends pasted text as a single string).
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    app.status = None;
    let clean = text.replace("\r\n", "\n").replace('\r', "\n");
    insert_text(app, &clean);
}

fn run_command(app: &mut App, id: &str) {
    if id == SUBMIT_THOUGHT.id {
        app.submit();
    }
}

/// Whether `key` is the binding a command asks the host for.
fn matches_hotkey(key: &KeyEvent, hotkey: &Hotkey) -> bool {
    let code = match hotkey.key {
        "Enter" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c.to_ascii_lowercase()),
                _ => return false,
            }
        }
    };
    let mut modifiers = KeyModifiers::NONE;
    for m in hotkey.modifiers {
        modifiers |= match *m {
            "Alt" => KeyModifiers::ALT,
            "Ctrl" | "Mod" => KeyModifiers::CONTROL,
            "Shift" => KeyModifiers::SHIFT,
            _ => return false,
        };
    }
    key.code == code && key.modifiers == modifiers
}
