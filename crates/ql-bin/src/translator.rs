//! Line-command translation: one typed line becomes one shell command.
//!
//! The shell is deliberately thin platform glue. Translation is pure (no
//! state mutation); path arguments play the role of the file-chooser result,
//! where an omitted path means the dialog was cancelled.

use core_actions::Action;
use core_config::{Settings, Theme};
use core_state::EditorState;
use core_text::EditCommand;
use std::path::PathBuf;

/// A parsed input line. `Action` routes through the dispatcher; the remaining
/// variants are text-surface or shell-local affordances handled by the loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Action(Action),
    /// Open with an optional chooser result (`None` = cancelled dialog).
    Open(Option<PathBuf>),
    Save(Option<PathBuf>),
    SaveAs(Option<PathBuf>),
    /// Type text into the active buffer at the caret.
    Insert(String),
    /// Set the active buffer's selection; `None` selects everything.
    Select(Option<(usize, usize)>),
    /// Print the active document's content.
    Show,
    Help,
    /// Blank line.
    Nothing,
}

/// Translate one input line. `Err` carries a user-facing message the shell
/// surfaces as an ephemeral notification.
pub fn translate(line: &str, state: &EditorState) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    match word {
        "new" => Ok(Command::Action(Action::NewDocument)),
        "open" => Ok(Command::Open(path_arg(rest))),
        "save" => Ok(Command::Save(path_arg(rest))),
        "saveas" | "save-as" => Ok(Command::SaveAs(path_arg(rest))),
        "close" => Ok(Command::Action(Action::CloseActive)),
        "next" => Ok(Command::Action(Action::SelectNext)),
        "prev" | "previous" => Ok(Command::Action(Action::SelectPrevious)),
        "tab" => tab_by_index(rest, state),
        "undo" => Ok(Command::Action(Action::Edit(EditCommand::Undo))),
        "redo" => Ok(Command::Action(Action::Edit(EditCommand::Redo))),
        "cut" => Ok(Command::Action(Action::Edit(EditCommand::Cut))),
        "copy" => Ok(Command::Action(Action::Edit(EditCommand::Copy))),
        "paste" => Ok(Command::Action(Action::Edit(EditCommand::Paste))),
        "theme" => match rest {
            "light" => Ok(Command::Action(Action::SetTheme(Theme::Light))),
            "dark" => Ok(Command::Action(Action::SetTheme(Theme::Dark))),
            "" | "toggle" => Ok(Command::Action(Action::ToggleTheme)),
            other => Err(format!("unknown theme: {other} (light|dark|toggle)")),
        },
        // Family validation happens in the settings layer; pass raw input on.
        "font" => Ok(Command::Action(Action::SetFontFamily(rest.to_string()))),
        "fontsize" => Settings::parse_font_size(rest)
            .map(|n| Command::Action(Action::SetFontSize(n)))
            .map_err(|e| e.to_string()),
        "type" => Ok(Command::Insert(rest.to_string())),
        "select" => select_range(rest),
        "show" => Ok(Command::Show),
        "term" | "terminal" => Ok(Command::Action(Action::OpenTerminal)),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Action(Action::Quit)),
        other => Err(format!("unknown command: {other} (try 'help')")),
    }
}

fn path_arg(rest: &str) -> Option<PathBuf> {
    if rest.is_empty() {
        None
    } else {
        Some(PathBuf::from(rest))
    }
}

/// `tab <n>` selects by 1-based tab-strip position, resolved to the stable
/// document id before dispatch.
fn tab_by_index(rest: &str, state: &EditorState) -> Result<Command, String> {
    let n: usize = rest
        .parse()
        .map_err(|_| format!("usage: tab <1..{}>", state.registry.len()))?;
    state
        .registry
        .documents()
        .get(n.wrapping_sub(1))
        .map(|doc| Command::Action(Action::SelectDocument(doc.id())))
        .ok_or_else(|| format!("no tab {n} (1..{})", state.registry.len()))
}

fn select_range(rest: &str) -> Result<Command, String> {
    if rest == "all" {
        return Ok(Command::Select(None));
    }
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if let [start, end] = parts.as_slice()
        && let (Ok(start), Ok(end)) = (start.parse(), end.parse())
    {
        return Ok(Command::Select(Some((start, end))));
    }
    Err("usage: select all | select <start> <end>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::Settings;

    fn state() -> EditorState {
        EditorState::new(Settings::default(), None)
    }

    #[test]
    fn blank_and_simple_commands() {
        let state = state();
        assert_eq!(translate("", &state), Ok(Command::Nothing));
        assert_eq!(translate("  \t ", &state), Ok(Command::Nothing));
        assert_eq!(
            translate("new", &state),
            Ok(Command::Action(Action::NewDocument))
        );
        assert_eq!(
            translate("undo", &state),
            Ok(Command::Action(Action::Edit(EditCommand::Undo)))
        );
        assert_eq!(translate("q", &state), Ok(Command::Action(Action::Quit)));
    }

    #[test]
    fn open_and_save_carry_optional_paths() {
        let state = state();
        assert_eq!(translate("open", &state), Ok(Command::Open(None)));
        assert_eq!(
            translate("open /tmp/a.txt", &state),
            Ok(Command::Open(Some(PathBuf::from("/tmp/a.txt"))))
        );
        assert_eq!(
            translate("saveas notes with spaces.txt", &state),
            Ok(Command::SaveAs(Some(PathBuf::from(
                "notes with spaces.txt"
            ))))
        );
    }

    #[test]
    fn theme_variants() {
        let state = state();
        assert_eq!(
            translate("theme dark", &state),
            Ok(Command::Action(Action::SetTheme(Theme::Dark)))
        );
        assert_eq!(
            translate("theme", &state),
            Ok(Command::Action(Action::ToggleTheme))
        );
        assert!(translate("theme sepia", &state).is_err());
    }

    #[test]
    fn fontsize_validates_before_dispatch() {
        let state = state();
        assert_eq!(
            translate("fontsize 14", &state),
            Ok(Command::Action(Action::SetFontSize(14)))
        );
        let err = translate("fontsize 0", &state).unwrap_err();
        assert!(err.contains("positive integer"));
        assert!(translate("fontsize big", &state).is_err());
    }

    #[test]
    fn tab_resolves_position_to_document_id() {
        let mut state = state();
        let first = state.registry.active().unwrap().id();
        state.create_document();
        assert_eq!(
            translate("tab 1", &state),
            Ok(Command::Action(Action::SelectDocument(first)))
        );
        assert!(translate("tab 9", &state).is_err());
        assert!(translate("tab zero", &state).is_err());
    }

    #[test]
    fn select_parses_ranges() {
        let state = state();
        assert_eq!(translate("select all", &state), Ok(Command::Select(None)));
        assert_eq!(
            translate("select 2 7", &state),
            Ok(Command::Select(Some((2, 7))))
        );
        assert!(translate("select 2", &state).is_err());
    }

    #[test]
    fn type_preserves_inner_whitespace() {
        let state = state();
        assert_eq!(
            translate("type hello  world", &state),
            Ok(Command::Insert("hello  world".to_string()))
        );
    }

    #[test]
    fn unknown_command_reports() {
        let state = state();
        let err = translate("frobnicate", &state).unwrap_err();
        assert!(err.contains("frobnicate"));
    }
}
