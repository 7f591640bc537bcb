//! Rope-based text surface backing each open document.
//!
//! `Buffer` is the mutable character sequence a document owns. The session
//! core treats it as a collaborator surface: it reads the whole text, replaces
//! the whole text, and forwards edit commands (undo/redo/cut/copy/paste)
//! without interpreting their internals. Undo granularity is whole-buffer
//! snapshots; a rope makes those snapshots cheap (structural sharing), so the
//! history cap exists only to bound worst-case growth.
//!
//! Cut/copy operate on the buffer's selection span and paste inserts at the
//! caret. All three go through the process-wide [`Clipboard`], which the
//! top-level state owns so content moves freely between documents.

use ropey::Rope;
use tracing::trace;

/// Maximum retained undo snapshots per buffer. Oldest entries are discarded.
pub const UNDO_HISTORY_MAX: usize = 100;

/// Opaque edit commands the dispatcher forwards to the active buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
}

impl EditCommand {
    /// Stable lowercase name used in log events and status messages.
    pub fn name(self) -> &'static str {
        match self {
            EditCommand::Undo => "undo",
            EditCommand::Redo => "redo",
            EditCommand::Cut => "cut",
            EditCommand::Copy => "copy",
            EditCommand::Paste => "paste",
        }
    }
}

/// Process-wide clipboard shared by every document's cut/copy/paste.
#[derive(Debug, Default, Clone)]
pub struct Clipboard {
    content: Option<String>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace clipboard content.
    pub fn set(&mut self, text: impl Into<String>) {
        self.content = Some(text.into());
    }

    /// Current content, if any non-empty payload has been stored.
    pub fn get(&self) -> Option<&str> {
        self.content.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}

/// One document's text content plus caret, selection, and undo state.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    rope: Rope,
    /// Caret as a char index into the rope, always <= len_chars.
    caret: usize,
    /// Selection as a half-open char range (start < end after normalization).
    selection: Option<(usize, usize)>,
    undo: Vec<Rope>,
    redo: Vec<Rope>,
}

impl Buffer {
    /// Empty buffer (fresh untitled document).
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer seeded from file content. The caret starts at the beginning and
    /// the history starts empty, so undo cannot reach past the loaded state.
    pub fn from_text(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            ..Self::default()
        }
    }

    /// Full text as an owned `String`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Caret position as a char index.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Current selection span, normalized so start < end.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    /// Replace the entire content, recording the prior content for undo.
    /// Returns true if the text actually changed.
    pub fn set_text(&mut self, content: &str) -> bool {
        if self.rope.len_chars() == content.chars().count() && self.rope.to_string() == content {
            return false;
        }
        self.snapshot();
        self.rope = Rope::from_str(content);
        self.clamp_ephemeral();
        true
    }

    /// Move the caret, clamped to the buffer length.
    pub fn set_caret(&mut self, at: usize) {
        self.caret = at.min(self.rope.len_chars());
    }

    /// Select the half-open char range `[start, end)`, clamped to the buffer.
    /// An empty range clears the selection.
    pub fn select(&mut self, start: usize, end: usize) {
        let len = self.rope.len_chars();
        let (mut a, mut b) = (start.min(len), end.min(len));
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        self.selection = if a == b { None } else { Some((a, b)) };
    }

    /// Select the whole buffer (no-op on empty content).
    pub fn select_all(&mut self) {
        self.select(0, self.rope.len_chars());
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Insert text at the caret, recording undo state. The caret advances past
    /// the insertion. Returns true if anything was inserted.
    pub fn insert(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.snapshot();
        self.rope.insert(self.caret, text);
        self.caret += text.chars().count();
        self.selection = None;
        true
    }

    /// Apply an opaque edit command. Returns true when the command did
    /// something; false is the command's own no-op report (undo with empty
    /// history, copy with no selection, paste with empty clipboard).
    pub fn apply(&mut self, cmd: EditCommand, clipboard: &mut Clipboard) -> bool {
        let applied = match cmd {
            EditCommand::Undo => self.undo(),
            EditCommand::Redo => self.redo(),
            EditCommand::Copy => self.copy(clipboard),
            EditCommand::Cut => self.cut(clipboard),
            EditCommand::Paste => self.paste(clipboard),
        };
        trace!(target: "text", command = cmd.name(), applied, "edit_command");
        applied
    }

    fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(prev) => {
                self.redo.push(std::mem::replace(&mut self.rope, prev));
                self.clamp_ephemeral();
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push(std::mem::replace(&mut self.rope, next));
                self.clamp_ephemeral();
                true
            }
            None => false,
        }
    }

    fn copy(&mut self, clipboard: &mut Clipboard) -> bool {
        match self.selected_text() {
            Some(text) => {
                clipboard.set(text);
                true
            }
            None => false,
        }
    }

    fn cut(&mut self, clipboard: &mut Clipboard) -> bool {
        let Some((start, end)) = self.selection else {
            return false;
        };
        let text = self.rope.slice(start..end).to_string();
        self.snapshot();
        self.rope.remove(start..end);
        clipboard.set(text);
        self.caret = start;
        self.selection = None;
        true
    }

    fn paste(&mut self, clipboard: &mut Clipboard) -> bool {
        let Some(text) = clipboard.get().map(str::to_owned) else {
            return false;
        };
        // Pasting over a selection replaces it.
        if let Some((start, end)) = self.selection {
            self.snapshot();
            self.rope.remove(start..end);
            self.rope.insert(start, &text);
            self.caret = start + text.chars().count();
            self.selection = None;
        } else {
            self.snapshot();
            self.rope.insert(self.caret, &text);
            self.caret += text.chars().count();
        }
        true
    }

    fn selected_text(&self) -> Option<String> {
        self.selection
            .map(|(start, end)| self.rope.slice(start..end).to_string())
    }

    /// Push the current content onto the undo stack and invalidate redo.
    fn snapshot(&mut self) {
        if self.undo.len() == UNDO_HISTORY_MAX {
            self.undo.remove(0);
        }
        self.undo.push(self.rope.clone());
        self.redo.clear();
    }

    /// Caret and selection refer to char indices of the previous content;
    /// re-clamp after any wholesale content replacement.
    fn clamp_ephemeral(&mut self) {
        let len = self.rope.len_chars();
        self.caret = self.caret.min(len);
        if let Some((start, end)) = self.selection {
            if end > len || start >= len {
                self.selection = None;
            }
        }
    }
}
