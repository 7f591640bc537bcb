//! Dispatcher applying [`Action`] to mutable editor state.
//!
//! Stateless routing: every command resolves the active document exactly once
//! from the registry's stored id, then delegates to the file service, the
//! presentation settings, or the buffer. Failure policy per the error design:
//! all I/O and validation errors are caught here and surfaced as ephemeral
//! status messages; none of them leaves the registry partially updated (a
//! failed save neither renames the tab nor updates the binding), and none is
//! fatal: the editor stays usable after any single failed operation.

use crate::{Action, FileChooser, terminal};
use core_files::{read_document, write_document};
use core_state::{EditorState, SessionError};
use core_text::EditCommand;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// How long status notifications linger before the shell clears them.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Result of dispatching a single [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// State (documents, selection, settings, or status line) changed and the
    /// surface should re-render.
    pub dirty: bool,
    pub quit: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            quit: false,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            quit: false,
        }
    }
    pub fn quit() -> Self {
        Self {
            dirty: true,
            quit: true,
        }
    }
}

/// Apply a user action to editor state.
pub fn dispatch(
    action: Action,
    state: &mut EditorState,
    chooser: &mut dyn FileChooser,
) -> DispatchResult {
    match action {
        Action::NewDocument => {
            state.create_document();
            DispatchResult::dirty()
        }
        Action::OpenFile => handle_open(state, chooser),
        Action::Save => handle_save(state, chooser),
        Action::SaveAs => handle_save_as(state, chooser),
        Action::CloseActive => handle_close(state),
        Action::SelectDocument(id) => match state.registry.select(id) {
            Ok(()) => DispatchResult::dirty(),
            Err(e) => recoverable(state, e),
        },
        Action::SelectNext => {
            state.registry.select_next();
            DispatchResult::dirty()
        }
        Action::SelectPrevious => {
            state.registry.select_previous();
            DispatchResult::dirty()
        }
        Action::Edit(cmd) => handle_edit(state, cmd),
        Action::ToggleTheme => {
            let theme = state.settings.toggle_theme();
            info!(target: "config", theme = theme.name(), "theme_changed");
            apply_presentation_change(state)
        }
        Action::SetTheme(theme) => {
            state.settings.set_theme(theme);
            info!(target: "config", theme = theme.name(), "theme_changed");
            apply_presentation_change(state)
        }
        Action::SetFontFamily(family) => match state.settings.set_font_family(&family) {
            Ok(()) => apply_presentation_change(state),
            Err(e) => recoverable(state, e),
        },
        Action::SetFontSize(size) => match state.settings.set_font_size(size) {
            Ok(()) => apply_presentation_change(state),
            Err(e) => recoverable(state, e),
        },
        Action::OpenTerminal => {
            terminal::spawn_terminal();
            DispatchResult::clean()
        }
        Action::Quit => DispatchResult::quit(),
    }
}

fn handle_open(state: &mut EditorState, chooser: &mut dyn FileChooser) -> DispatchResult {
    // Cancelled chooser: complete no-op, not an error.
    let Some(path) = chooser.pick_open() else {
        return DispatchResult::clean();
    };
    match read_document(&path) {
        Ok(content) => {
            let id = state.load_document(path, &content);
            info!(target: "session", id = %id, "open_complete");
            DispatchResult::dirty()
        }
        Err(e) => recoverable(state, e),
    }
}

fn handle_save(state: &mut EditorState, chooser: &mut dyn FileChooser) -> DispatchResult {
    let binding = match state.registry.active() {
        Ok(doc) => doc.binding().map(PathBuf::from),
        Err(e) => return no_active(state, e),
    };
    match binding {
        Some(path) => write_active(state, path, false),
        // Plain save with no binding degrades to save-as.
        None => handle_save_as(state, chooser),
    }
}

fn handle_save_as(state: &mut EditorState, chooser: &mut dyn FileChooser) -> DispatchResult {
    let suggested = match state.registry.active() {
        Ok(doc) => doc.label().to_string(),
        Err(e) => return no_active(state, e),
    };
    // Save-as always re-prompts, regardless of an existing binding.
    let Some(path) = chooser.pick_save(&suggested) else {
        return DispatchResult::clean();
    };
    write_active(state, path, true)
}

/// Write the active document's content to `path`. Binding and label change
/// (together) only after the write succeeded, so a failed save leaves the tab
/// exactly as it was, dirty flag included.
fn write_active(state: &mut EditorState, path: PathBuf, rebind: bool) -> DispatchResult {
    let content = match state.registry.active() {
        Ok(doc) => doc.buffer.text(),
        Err(e) => return no_active(state, e),
    };
    match write_document(&path, &content) {
        Ok(()) => {
            if rebind
                && let Err(e) = state.registry.bind_active(path.clone())
            {
                return no_active(state, e);
            }
            let label = match state.registry.active_mut() {
                Ok(doc) => {
                    doc.mark_clean();
                    doc.label().to_string()
                }
                Err(e) => return no_active(state, e),
            };
            info!(target: "session", file = %path.display(), label = label.as_str(), "save_complete");
            state.set_ephemeral(format!("Saved {label}"), STATUS_TTL);
            DispatchResult::dirty()
        }
        Err(e) => recoverable(state, e),
    }
}

fn handle_close(state: &mut EditorState) -> DispatchResult {
    let id = match state.registry.active() {
        Ok(doc) => doc.id(),
        Err(e) => return no_active(state, e),
    };
    match state.close_document(id) {
        Ok(()) => DispatchResult::dirty(),
        Err(e) => recoverable(state, e),
    }
}

fn handle_edit(state: &mut EditorState, cmd: EditCommand) -> DispatchResult {
    let EditorState {
        registry,
        clipboard,
        ..
    } = state;
    let outcome = match registry.active_mut() {
        Ok(doc) => {
            let applied = doc.buffer.apply(cmd, clipboard);
            if applied && !matches!(cmd, EditCommand::Copy) {
                doc.mark_dirty();
            }
            Ok(applied)
        }
        Err(e) => Err(e),
    };
    match outcome {
        Ok(true) => DispatchResult::dirty(),
        Ok(false) => {
            // The buffer reported its own no-op (nothing to undo, empty
            // clipboard, no selection).
            state.set_ephemeral(format!("Nothing to {}", cmd.name()), STATUS_TTL);
            DispatchResult::dirty()
        }
        Err(e) => no_active(state, e),
    }
}

/// Settings changed: fan the new style out to every open document and persist.
fn apply_presentation_change(state: &mut EditorState) -> DispatchResult {
    state.restyle_all();
    state.persist_settings();
    DispatchResult::dirty()
}

/// Surface a recoverable error as a dismissable notification.
fn recoverable(state: &mut EditorState, error: impl std::fmt::Display) -> DispatchResult {
    warn!(target: "session", error = %error, "command_failed");
    state.set_ephemeral(error.to_string(), STATUS_TTL);
    DispatchResult::dirty()
}

/// An operation needed an active document and found none. Structurally
/// impossible while the never-empty invariant holds; handled defensively.
fn no_active(state: &mut EditorState, error: SessionError) -> DispatchResult {
    warn!(target: "session", error = %error, "active_document_missing");
    state.set_ephemeral(error.to_string(), STATUS_TTL);
    DispatchResult::dirty()
}
