//! End-to-end session flows through the dispatcher against real files.

use core_actions::{Action, FileChooser, dispatch};
use core_config::{Settings, Theme};
use core_state::EditorState;
use core_text::EditCommand;
use std::path::PathBuf;

/// Dialog stand-in: yields the queued path once, then reports cancellation.
#[derive(Default)]
struct ScriptedChooser {
    next: Option<PathBuf>,
}

impl ScriptedChooser {
    fn with(path: impl Into<PathBuf>) -> Self {
        Self {
            next: Some(path.into()),
        }
    }
}

impl FileChooser for ScriptedChooser {
    fn pick_open(&mut self) -> Option<PathBuf> {
        self.next.take()
    }
    fn pick_save(&mut self, _suggested: &str) -> Option<PathBuf> {
        self.next.take()
    }
}

#[test]
fn open_edit_save_flow_hits_disk() {
    let dir = tempfile::tempdir().unwrap();
    let draft = dir.path().join("draft.txt");
    std::fs::write(&draft, "hello\n").unwrap();

    let mut state = EditorState::new(Settings::default(), None);
    dispatch(
        Action::OpenFile,
        &mut state,
        &mut ScriptedChooser::with(&draft),
    );
    let doc = state.registry.active().unwrap();
    assert_eq!(doc.label(), "draft.txt");
    assert_eq!(doc.buffer.text(), "hello\n");

    {
        let doc = state.registry.active_mut().unwrap();
        doc.buffer.set_caret(5);
        assert!(doc.buffer.insert(", world"));
        doc.mark_dirty();
    }
    assert_eq!(state.registry.active().unwrap().tab_title(), "draft.txt*");

    // Bound document: plain save goes straight to the binding.
    dispatch(Action::Save, &mut state, &mut ScriptedChooser::default());
    assert_eq!(
        std::fs::read_to_string(&draft).unwrap(),
        "hello, world\n"
    );
    assert!(!state.registry.active().unwrap().is_dirty());
}

#[test]
fn undo_after_cut_restores_file_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, "keep this line").unwrap();

    let mut state = EditorState::new(Settings::default(), None);
    dispatch(
        Action::OpenFile,
        &mut state,
        &mut ScriptedChooser::with(&path),
    );
    state.registry.active_mut().unwrap().buffer.select_all();
    dispatch(
        Action::Edit(EditCommand::Cut),
        &mut state,
        &mut ScriptedChooser::default(),
    );
    assert_eq!(state.registry.active().unwrap().buffer.text(), "");

    dispatch(
        Action::Edit(EditCommand::Undo),
        &mut state,
        &mut ScriptedChooser::default(),
    );
    assert_eq!(
        state.registry.active().unwrap().buffer.text(),
        "keep this line"
    );
}

#[test]
fn presentation_settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("quill.toml");

    let mut state = EditorState::new(
        core_config::load_from(Some(settings_path.clone())),
        Some(settings_path.clone()),
    );
    dispatch(
        Action::ToggleTheme,
        &mut state,
        &mut ScriptedChooser::default(),
    );
    dispatch(
        Action::SetFontFamily("Courier".into()),
        &mut state,
        &mut ScriptedChooser::default(),
    );

    // "Restart": reload settings from disk into a fresh editor state.
    let reloaded = core_config::load_from(Some(settings_path));
    assert_eq!(reloaded.theme, Theme::Dark);
    assert_eq!(reloaded.font_family, "Courier");

    let restarted = EditorState::new(reloaded, None);
    let doc = restarted.registry.active().unwrap();
    assert_eq!(doc.style.background, "#1e1e1e");
    assert_eq!(doc.style.font_family, "Courier");
}

#[test]
fn failed_save_keeps_session_usable() {
    let dir = tempfile::tempdir().unwrap();

    let mut state = EditorState::new(Settings::default(), None);
    state
        .registry
        .active_mut()
        .unwrap()
        .buffer
        .set_text("not lost");
    state.registry.active_mut().unwrap().mark_dirty();

    let bad_target = dir.path().join("missing-dir").join("out.txt");
    let result = dispatch(
        Action::SaveAs,
        &mut state,
        &mut ScriptedChooser::with(&bad_target),
    );
    assert!(!result.quit);
    let doc = state.registry.active().unwrap();
    assert_eq!(doc.buffer.text(), "not lost");
    assert!(doc.is_dirty());
    assert_eq!(doc.label(), "Untitled-1");

    // The editor keeps working: a good save-as right after succeeds.
    let good_target = dir.path().join("out.txt");
    dispatch(
        Action::SaveAs,
        &mut state,
        &mut ScriptedChooser::with(&good_target),
    );
    assert_eq!(core_files::read_document(&good_target).unwrap(), "not lost");
    assert_eq!(state.registry.active().unwrap().label(), "out.txt");
}
