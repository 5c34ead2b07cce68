//! xbindkeys - static binding file, daemon control, autostart entry
//!
//! Each binding is kept in a marked block so re-running only replaces our
//! own entry and leaves the rest of the user's `~/.xbindkeysrc` alone.

use super::filesystem;
use super::PlatformResult;
use async_trait::async_trait;
use snapbind_core::{BackendError, BindingDaemon, BindingFileWriter, BindingSpec, KeyCombo};
use snapbind_executor::CommandExecutor;
use std::path::{Path, PathBuf};
use sysinfo::{get_current_pid, ProcessRefreshKind, System, UpdateKind};
use tokio::task;

pub const DAEMON: &str = "xbindkeys";
pub const AUTOSTART_FILE: &str = "xbindkeys.desktop";

const AUTOSTART_ENTRY: &str = "[Desktop Entry]
Type=Application
Name=xbindkeys
Exec=xbindkeys
Terminal=false
Hidden=false
NoDisplay=false
X-GNOME-Autostart-enabled=true
";

pub struct XbindkeysConfig {
    path: PathBuf,
}

impl XbindkeysConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.xbindkeysrc`
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(".xbindkeysrc"))
    }
}

#[async_trait]
impl BindingFileWriter for XbindkeysConfig {
    async fn write_binding(
        &self,
        spec: &BindingSpec,
        combo: &KeyCombo,
    ) -> Result<PathBuf, BackendError> {
        let existing = filesystem::read_or_empty(&self.path)
            .await
            .map_err(|e| BackendError::Io(e.to_string()))?;
        let block = render_block(spec, combo);
        let updated = upsert_block(&existing, &spec.display_name, &block);

        filesystem::write_atomic(&self.path, &updated)
            .await
            .map_err(|e| BackendError::Io(e.to_string()))?;
        tracing::info!("Configured xbindkeys at {}", self.path.display());
        Ok(self.path.clone())
    }
}

const BEGIN_PREFIX: &str = "# >>> snapbind:";

fn begin_marker(name: &str) -> String {
    format!("{BEGIN_PREFIX} {name}")
}

const END_MARKER: &str = "# <<< snapbind";

/// One xbindkeys entry: quoted command line, then the indented key line.
pub fn render_block(spec: &BindingSpec, combo: &KeyCombo) -> String {
    let command = spec.command.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "{}\n\"{}\"\n  {}\n{}\n",
        begin_marker(&spec.display_name),
        command,
        combo.to_xbindkeys(),
        END_MARKER
    )
}

/// Replace the block for `name` in `existing`, or append it.
///
/// A begin marker without a matching end marker is dropped on its own;
/// the lines after it stay untouched.
pub fn upsert_block(existing: &str, name: &str, block: &str) -> String {
    let begin = begin_marker(name);
    let lines: Vec<&str> = existing.lines().collect();
    let mut out = String::new();
    let mut replaced = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.trim_end() != begin {
            out.push_str(line);
            out.push('\n');
            i += 1;
            continue;
        }

        match block_end(&lines, i + 1) {
            Some(end) => {
                if !replaced {
                    out.push_str(block);
                    replaced = true;
                }
                i = end + 1;
            }
            None => {
                tracing::warn!("Unterminated snapbind block for '{}' in xbindkeys file", name);
                i += 1;
            }
        }
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with("\n\n") {
            out.push('\n');
        }
        out.push_str(block);
    }
    out
}

/// Index of the end marker closing a block opened just before `from`.
/// Another begin marker first means the block was never closed.
fn block_end(lines: &[&str], from: usize) -> Option<usize> {
    for (offset, line) in lines[from..].iter().enumerate() {
        let line = line.trim_end();
        if line == END_MARKER {
            return Some(from + offset);
        }
        if line.starts_with(BEGIN_PREFIX) {
            return None;
        }
    }
    None
}

/// Controls the xbindkeys processes owned by the current user.
pub struct XbindkeysDaemon {
    executor: CommandExecutor,
}

impl XbindkeysDaemon {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }
}

/// Only processes with a known owner equal to ours qualify.
fn same_owner<U: PartialEq>(process: Option<&U>, own: Option<&U>) -> bool {
    matches!((process, own), (Some(process), Some(own)) if process == own)
}

#[async_trait]
impl BindingDaemon for XbindkeysDaemon {
    async fn stop(&self) -> Result<(), BackendError> {
        let killed = task::spawn_blocking(|| {
            let mut system = System::new();
            system.refresh_processes_specifics(
                ProcessRefreshKind::new().with_user(UpdateKind::Always),
            );
            let own = get_current_pid()
                .ok()
                .and_then(|pid| system.process(pid))
                .and_then(|process| process.user_id())
                .cloned();
            if own.is_none() {
                tracing::debug!("Own user id unknown, leaving {} running", DAEMON);
            }
            system
                .processes_by_exact_name(DAEMON)
                .filter(|process| same_owner(process.user_id(), own.as_ref()))
                .filter(|process| process.kill())
                .count()
        })
        .await
        .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        if killed > 0 {
            tracing::info!("Stopped {} {} process(es)", killed, DAEMON);
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), BackendError> {
        let pid = self
            .executor
            .spawn_detached(DAEMON, &[])
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        tracing::info!("Started {} (pid {})", DAEMON, pid);
        Ok(())
    }
}

/// Make xbindkeys start with the desktop session.
pub async fn install_autostart(autostart_dir: &Path) -> PlatformResult<PathBuf> {
    let path = autostart_dir.join(AUTOSTART_FILE);
    filesystem::write_atomic(&path, AUTOSTART_ENTRY).await?;
    tracing::info!("Added xbindkeys to autostart at {}", path.display());
    Ok(path)
}

pub async fn remove_autostart(autostart_dir: &Path) -> PlatformResult<bool> {
    let removed = filesystem::remove_if_exists(autostart_dir.join(AUTOSTART_FILE)).await?;
    if removed {
        tracing::info!("Removed xbindkeys autostart entry");
    }
    Ok(removed)
}
