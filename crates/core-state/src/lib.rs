//! Session state: the ordered set of open documents and the active selection.
//!
//! The registry is the single source of truth for "which document is current".
//! Selection is an explicit stored id, updated only by selection-changing
//! operations; it is never inferred from widget focus or visibility, which is
//! exactly the class of lookup that mutates the wrong tab during layout
//! transitions. Document identity is a stable [`DocumentId`] assigned at
//! creation and never reused, so file bindings and selection survive renames
//! and save-as without aliasing.
//!
//! Invariants upheld by every public operation:
//! * `active`, when set, names an existing entry in `documents`.
//! * Insertion order is tab display order and is preserved by everything
//!   except explicit close.
//! * The untitled counter only ever increases; closing `Untitled-3` never
//!   causes a later `Untitled-3` to appear.
//! * The registry owned by [`EditorState`] is never empty: closing the last
//!   document immediately creates a fresh untitled one.
//!
//! Labels are display-only. Two documents may momentarily share a label (two
//! `notes.txt` files from different directories); nothing keys off label text.

use core_config::{DocStyle, Settings};
use core_text::{Buffer, Clipboard};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Stable, opaque identity of one open document. Assigned at creation, never
/// reused or reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Session-level failures: an id that no longer resolves, or an operation that
/// needs an active document when none exists. The latter is structurally
/// prevented by [`EditorState`] but still handled defensively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no document with id {0}")]
    NotFound(DocumentId),
    #[error("no open documents")]
    Empty,
}

/// One open text buffer plus its optional file binding and display label.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    label: String,
    binding: Option<PathBuf>,
    dirty: bool,
    /// Text content, owned exclusively by this document.
    pub buffer: Buffer,
    /// Resolved presentation (colors + font) for this document's surface,
    /// refreshed by the presentation fan-out.
    pub style: DocStyle,
}

impl Document {
    fn untitled(id: DocumentId, seq: u64, style: DocStyle) -> Self {
        Self {
            id,
            label: format!("Untitled-{seq}"),
            binding: None,
            dirty: false,
            buffer: Buffer::new(),
            style,
        }
    }

    fn from_file(id: DocumentId, path: PathBuf, content: &str, style: DocStyle) -> Self {
        Self {
            id,
            label: basename(&path),
            binding: Some(path),
            dirty: false,
            buffer: Buffer::from_text(content),
            style,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Tab title. Display-only; never a lookup key.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Bound file path, if this document has been saved or was opened from
    /// disk.
    pub fn binding(&self) -> Option<&Path> {
        self.binding.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that content changed since the last load/save.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Record a successful load/save.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Rebind this document to `path`: binding and label change together,
    /// never one without the other.
    pub fn bind(&mut self, path: PathBuf) {
        self.label = basename(&path);
        self.binding = Some(path);
    }

    /// Title shown in the tab strip: the label, starred while unsaved changes
    /// exist.
    pub fn tab_title(&self) -> String {
        if self.dirty {
            format!("{}*", self.label)
        } else {
            self.label.clone()
        }
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}

/// Ordered collection of open documents plus the active-selection pointer.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    documents: Vec<Document>,
    active: Option<DocumentId>,
    next_id: u64,
    untitled_seq: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> DocumentId {
        self.next_id += 1;
        DocumentId(self.next_id)
    }

    /// Create a fresh untitled document, append it, and make it active.
    /// Always succeeds.
    pub fn create_document(&mut self, style: DocStyle) -> DocumentId {
        let id = self.alloc_id();
        self.untitled_seq += 1;
        let doc = Document::untitled(id, self.untitled_seq, style);
        debug!(target: "session", id = %id, label = doc.label.as_str(), "document_created");
        self.documents.push(doc);
        self.active = Some(id);
        id
    }

    /// Register a document loaded from `path`, append it, and make it active.
    ///
    /// If a document with the same binding is already open, that tab is
    /// focused instead and no duplicate view is created; the caller's freshly
    /// read content is dropped in favor of the live buffer.
    pub fn load_document(&mut self, path: PathBuf, content: &str, style: DocStyle) -> DocumentId {
        if let Some(existing) = self.find_by_binding(&path) {
            info!(target: "session", id = %existing, file = %path.display(), "document_already_open_focused");
            self.active = Some(existing);
            return existing;
        }
        let id = self.alloc_id();
        let doc = Document::from_file(id, path, content, style);
        info!(target: "session", id = %id, label = doc.label.as_str(), "document_loaded");
        self.documents.push(doc);
        self.active = Some(id);
        id
    }

    /// Make `id` the active document.
    pub fn select(&mut self, id: DocumentId) -> Result<(), SessionError> {
        if self.get(id).is_none() {
            return Err(SessionError::NotFound(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Id of the active document, if any document is open.
    pub fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    /// The active document, resolved by stored id.
    pub fn active(&self) -> Result<&Document, SessionError> {
        match self.active {
            Some(id) => self.get(id).ok_or(SessionError::NotFound(id)),
            None => Err(SessionError::Empty),
        }
    }

    pub fn active_mut(&mut self) -> Result<&mut Document, SessionError> {
        match self.active {
            Some(id) => self
                .documents
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or(SessionError::NotFound(id)),
            None => Err(SessionError::Empty),
        }
    }

    /// Update the active document's label (display text only).
    pub fn rename_active(&mut self, new_label: impl Into<String>) -> Result<(), SessionError> {
        let doc = self.active_mut()?;
        doc.label = new_label.into();
        Ok(())
    }

    /// Rebind the active document to `path`; label and binding update
    /// together. Used after a successful save-as.
    pub fn bind_active(&mut self, path: PathBuf) -> Result<(), SessionError> {
        let doc = self.active_mut()?;
        doc.bind(path);
        Ok(())
    }

    /// Remove `id`. When the active document closes, selection moves to the
    /// next document in tab order, falling back to the previous one when the
    /// closed tab was last. Callers that must keep the registry non-empty
    /// (the editor shell) create a replacement when `is_empty` afterwards.
    pub fn close(&mut self, id: DocumentId) -> Result<(), SessionError> {
        let idx = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(SessionError::NotFound(id))?;
        let closed = self.documents.remove(idx);
        debug!(target: "session", id = %id, label = closed.label.as_str(), "document_closed");
        if self.active == Some(id) {
            self.active = if self.documents.is_empty() {
                None
            } else {
                Some(self.documents[idx.min(self.documents.len() - 1)].id)
            };
        }
        Ok(())
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    /// Documents in tab display order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Mutable traversal in tab order, used by the presentation fan-out.
    pub fn documents_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.documents.iter_mut()
    }

    pub fn find_by_binding(&self, path: &Path) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|d| d.binding.as_deref() == Some(path))
            .map(|d| d.id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Cycle selection forward in tab order (wrapping). Returns the newly
    /// active id.
    pub fn select_next(&mut self) -> Option<DocumentId> {
        self.cycle(1)
    }

    /// Cycle selection backward in tab order (wrapping).
    pub fn select_previous(&mut self) -> Option<DocumentId> {
        self.cycle(-1)
    }

    fn cycle(&mut self, step: isize) -> Option<DocumentId> {
        if self.documents.is_empty() {
            return None;
        }
        let len = self.documents.len() as isize;
        let current = self
            .active
            .and_then(|id| self.documents.iter().position(|d| d.id == id))
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len) as usize;
        let id = self.documents[next].id;
        self.active = Some(id);
        Some(id)
    }
}

/// Ephemeral status message shown in the shell until it expires.
#[derive(Debug, Clone)]
pub struct EphemeralMessage {
    pub text: String,
    pub expires_at: Instant,
}

/// Top-level editor state: registry, presentation settings, clipboard, and
/// status surface. All formerly-ambient globals (font, theme, counters) live
/// here explicitly and are passed by reference into each component.
pub struct EditorState {
    pub registry: SessionRegistry,
    pub settings: Settings,
    pub clipboard: Clipboard,
    pub ephemeral_status: Option<EphemeralMessage>,
    /// Where settings are persisted after each change; `None` disables
    /// persistence (tests, read-only environments).
    pub settings_path: Option<PathBuf>,
}

impl EditorState {
    /// Create editor state with one fresh untitled document, establishing the
    /// never-empty invariant from the start.
    pub fn new(settings: Settings, settings_path: Option<PathBuf>) -> Self {
        let mut state = Self {
            registry: SessionRegistry::new(),
            settings,
            clipboard: Clipboard::new(),
            ephemeral_status: None,
            settings_path,
        };
        state.create_document();
        state
    }

    /// Create an untitled document styled with the current settings.
    pub fn create_document(&mut self) -> DocumentId {
        self.registry.create_document(self.settings.style())
    }

    /// Register file content as an open document (or focus the existing tab
    /// bound to the same path).
    pub fn load_document(&mut self, path: PathBuf, content: &str) -> DocumentId {
        self.registry
            .load_document(path, content, self.settings.style())
    }

    /// Close `id`, then restore the never-empty invariant by creating a fresh
    /// untitled document when the last tab went away.
    pub fn close_document(&mut self, id: DocumentId) -> Result<(), SessionError> {
        self.registry.close(id)?;
        if self.registry.is_empty() {
            self.create_document();
        }
        Ok(())
    }

    /// Presentation fan-out: push the current settings-derived style onto
    /// every open document, not only the active one.
    pub fn restyle_all(&mut self) {
        let style = self.settings.style();
        for doc in self.registry.documents_mut() {
            doc.style = style.clone();
        }
        debug!(
            target: "session",
            theme = self.settings.theme.name(),
            font_family = self.settings.font_family.as_str(),
            font_size = self.settings.font_size,
            "presentation_fanout"
        );
    }

    /// Write settings to their configured path. Failure is logged and
    /// swallowed; a broken settings file never disturbs editing.
    pub fn persist_settings(&self) {
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        if let Err(e) = self.settings.persist_to(path) {
            warn!(target: "config", error = %e, "settings_persist_failed");
        }
    }

    /// Set an ephemeral status message with a fixed timeout duration.
    pub fn set_ephemeral(&mut self, msg: impl Into<String>, ttl: Duration) {
        self.ephemeral_status = Some(EphemeralMessage {
            text: msg.into(),
            expires_at: Instant::now() + ttl,
        });
    }

    /// Tick ephemeral status; returns true if a message expired and was
    /// cleared.
    pub fn tick_ephemeral(&mut self) -> bool {
        if let Some(m) = &self.ephemeral_status
            && Instant::now() >= m.expires_at
        {
            self.ephemeral_status = None;
            return true;
        }
        false
    }
}
