//! # Launcher Module
//!
//! Opens files with the operating system's default handler.

use anyhow::Context;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Hands a file to an external viewer.
pub trait Launcher {
    fn open(&self, target: &Path) -> anyhow::Result<()>;
}

/// Operating system families that differ in how a file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Shell association through `cmd /C start`.
    Windows,
    MacOs,
    /// Linux and the BSDs, via `xdg-open`.
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// The command that opens `target` with its default handler.
    pub fn open_command(self, target: &Path) -> Command {
        let mut command = match self {
            Platform::Windows => {
                let mut command = Command::new("cmd");
                // The empty argument is the window title `start` expects first.
                command.args(["/C", "start", ""]);
                command
            }
            Platform::MacOs => Command::new("open"),
            Platform::Unix => Command::new("xdg-open"),
        };
        command.arg(target);
        command
    }
}

/// Launches through the current platform's opener without blocking on it.
pub struct SystemLauncher {
    platform: Platform,
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
        }
    }
}

impl Launcher for SystemLauncher {
    fn open(&self, target: &Path) -> anyhow::Result<()> {
        log::info!("opening {} ({:?})", target.display(), self.platform);
        spawn_detached(&mut self.platform.open_command(target))
            .with_context(|| format!("failed to open {}", target.display()))?;
        Ok(())
    }
}

/// Starts `command` without waiting for it. A background thread waits on the
/// child so it does not linger as a zombie once the opener exits.
pub fn spawn_detached(command: &mut Command) -> io::Result<thread::JoinHandle<()>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let program = command.get_program().to_string_lossy().into_owned();
    Ok(thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => log::debug!("{program} exited with {status}"),
        Ok(_) => {}
        Err(e) => log::warn!("failed to wait for {program}: {e}"),
    }))
}
