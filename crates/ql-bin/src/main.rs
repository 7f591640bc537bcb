//! Quill entrypoint: a line-oriented shell around the document session core.
//!
//! The shell is the thin platform layer: it renders the tab strip and status
//! line, translates typed commands into [`Action`]s, and supplies the
//! file-chooser collaborator. Everything with invariants lives in the core
//! crates; nothing here inspects widget state to decide which document a
//! command targets.

use anyhow::Result;
use core_actions::{Action, FileChooser, dispatch};
use core_state::EditorState;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod translator;
use translator::Command;

const STATUS_TTL: Duration = Duration::from_secs(3);

/// Chooser fed from the command line's path argument. `take` semantics mirror
/// a dialog: each prompt consumes the pending result, and no pending result
/// means the user cancelled.
#[derive(Default)]
struct LineChooser {
    next: Option<PathBuf>,
}

impl FileChooser for LineChooser {
    fn pick_open(&mut self) -> Option<PathBuf> {
        self.next.take()
    }
    fn pick_save(&mut self, _suggested: &str) -> Option<PathBuf> {
        self.next.take()
    }
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn run(&mut self) -> Result<EditorState> {
        self.configure_logging();
        Self::install_panic_hook();
        info!(target: "runtime", "startup");

        let settings_path = core_config::discover();
        let settings = core_config::load_from(Some(settings_path.clone()));
        info!(
            target: "runtime.startup",
            settings_path = %settings_path.display(),
            theme = settings.theme.name(),
            "bootstrap_complete"
        );
        Ok(EditorState::new(settings, Some(settings_path)))
    }

    fn configure_logging(&mut self) {
        let log_dir = Path::new(".");
        let log_path = log_dir.join("quill.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "quill.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    let mut state = startup.run()?;
    let stdin = io::stdin();
    run_loop(&mut state, stdin.lock())?;
    info!(target: "runtime", "shutdown");
    Ok(())
}

fn run_loop(state: &mut EditorState, mut input: impl BufRead) -> Result<()> {
    let mut chooser = LineChooser::default();
    let mut line = String::new();
    loop {
        state.tick_ephemeral();
        render(state);
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            // EOF is a normal quit.
            break;
        }
        let result = match translator::translate(&line, state) {
            Ok(Command::Nothing) => continue,
            Ok(Command::Help) => {
                print_help();
                continue;
            }
            Ok(Command::Show) => {
                show_active(state);
                continue;
            }
            Ok(Command::Insert(text)) => {
                if let Ok(doc) = state.registry.active_mut()
                    && doc.buffer.insert(&text)
                {
                    doc.mark_dirty();
                }
                continue;
            }
            Ok(Command::Select(range)) => {
                if let Ok(doc) = state.registry.active_mut() {
                    match range {
                        Some((start, end)) => doc.buffer.select(start, end),
                        None => doc.buffer.select_all(),
                    }
                }
                continue;
            }
            Ok(Command::Open(path)) => {
                chooser.next = path;
                dispatch(Action::OpenFile, state, &mut chooser)
            }
            Ok(Command::Save(path)) => {
                chooser.next = path;
                dispatch(Action::Save, state, &mut chooser)
            }
            Ok(Command::SaveAs(path)) => {
                chooser.next = path;
                dispatch(Action::SaveAs, state, &mut chooser)
            }
            Ok(Command::Action(action)) => dispatch(action, state, &mut chooser),
            Err(msg) => {
                state.set_ephemeral(msg, STATUS_TTL);
                continue;
            }
        };
        // A bound plain save never consults the chooser; drop any unconsumed
        // path so it cannot leak into a later dialog.
        chooser.next = None;
        if result.quit {
            break;
        }
    }
    Ok(())
}

/// Tab strip plus status line, rebuilt from state every iteration.
fn render(state: &EditorState) {
    let active = state.registry.active_id();
    let strip: Vec<String> = state
        .registry
        .documents()
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            if Some(doc.id()) == active {
                format!("[{}:{}]", i + 1, doc.tab_title())
            } else {
                format!(" {}:{} ", i + 1, doc.tab_title())
            }
        })
        .collect();
    println!("{}", strip.join(" "));

    let settings = &state.settings;
    let palette = settings.theme.palette();
    println!(
        "theme:{} ({} on {})  font:{} {}pt",
        settings.theme.name(),
        palette.foreground,
        palette.background,
        settings.font_family,
        settings.font_size
    );
    if let Some(msg) = &state.ephemeral_status {
        println!("* {}", msg.text);
    }
}

fn show_active(state: &EditorState) {
    match state.registry.active() {
        Ok(doc) => {
            println!("--- {} ---", doc.tab_title());
            println!("{}", doc.buffer.text());
        }
        Err(e) => println!("{e}"),
    }
}

fn print_help() {
    println!(
        "commands:\n  \
         new | open [path] | save [path] | saveas [path] | close\n  \
         tab <n> | next | prev | show\n  \
         type <text> | select all | select <start> <end>\n  \
         undo | redo | cut | copy | paste\n  \
         theme [light|dark|toggle] | font <family> | fontsize <n>\n  \
         term | help | quit"
    );
}
