//! User intents and their routing against the active document.
//!
//! [`Action`] is the complete vocabulary of user-issued commands. The
//! [`dispatcher`] resolves the active document once per command from the
//! session registry's stored id and routes to the file service, the
//! presentation settings, or the document's own buffer. Platform surfaces
//! (dialogs, menus, key bindings) live outside this crate; they reach in only
//! through [`FileChooser`] and by constructing `Action`s.

use core_config::Theme;
use core_state::DocumentId;
use core_text::EditCommand;
use std::path::PathBuf;

pub mod dispatcher;
pub mod terminal;

pub use dispatcher::{DispatchResult, dispatch};

/// A single user-issued command, routed against the active document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a fresh untitled document and focus it.
    NewDocument,
    /// Prompt for a file and open it (focuses the existing tab when the file
    /// is already open).
    OpenFile,
    /// Save the active document to its binding; degrades to save-as when
    /// unbound.
    Save,
    /// Prompt for a destination and save there, rebinding the document.
    SaveAs,
    /// Close the active document.
    CloseActive,
    /// Focus a specific document.
    SelectDocument(DocumentId),
    /// Focus the next tab in display order (wrapping).
    SelectNext,
    /// Focus the previous tab in display order (wrapping).
    SelectPrevious,
    /// Forward an opaque edit command to the active document's buffer.
    Edit(EditCommand),
    ToggleTheme,
    SetTheme(Theme),
    SetFontFamily(String),
    SetFontSize(u32),
    /// Fire-and-forget spawn of an external terminal.
    OpenTerminal,
    Quit,
}

/// File open/save dialogs, supplied by the platform layer. `None` means the
/// user cancelled, which every caller treats as a complete no-op, never as
/// an error.
pub trait FileChooser {
    /// Ask the user for an existing file to open.
    fn pick_open(&mut self) -> Option<PathBuf>;
    /// Ask the user for a save destination. `suggested` is the current label,
    /// offered as the default file name.
    fn pick_save(&mut self, suggested: &str) -> Option<PathBuf>;
}
