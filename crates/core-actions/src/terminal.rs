//! External terminal launcher: fire-and-forget platform glue.
//!
//! Spawning is best-effort. A failure is logged and ignored; it never
//! propagates into editor state.

use std::process::Command;
use tracing::{info, warn};

/// Launch the platform's terminal emulator, detached from the editor.
pub fn spawn_terminal() {
    let mut command = platform_command();
    match command.spawn() {
        Ok(child) => {
            info!(target: "runtime", pid = child.id(), "terminal_spawned");
        }
        Err(e) => {
            warn!(target: "runtime", error = %e, "terminal_spawn_failed");
        }
    }
}

#[cfg(target_os = "macos")]
fn platform_command() -> Command {
    let mut c = Command::new("open");
    c.args(["-a", "Terminal"]);
    c
}

#[cfg(target_os = "windows")]
fn platform_command() -> Command {
    let mut c = Command::new("cmd");
    c.args(["/c", "start", "cmd"]);
    c
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_command() -> Command {
    Command::new("x-terminal-emulator")
}
