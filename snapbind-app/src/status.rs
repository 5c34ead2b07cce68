//! Install status shared between the provisioning task and the display loop.
//!
//! One writer (the background task), any number of readers. Readers poll
//! the latest value and never wait on the writer.

use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Packages,
    Directories,
    WrapperScript,
    Detecting,
    Keybinding,
    Finalizing,
    Done,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Starting => "Starting",
            Phase::Packages => "Packages",
            Phase::Directories => "Directories",
            Phase::WrapperScript => "Wrapper script",
            Phase::Detecting => "Session",
            Phase::Keybinding => "Keybinding",
            Phase::Finalizing => "Finalizing",
            Phase::Done => "Done",
            Phase::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallStatus {
    pub phase: Phase,
    pub message: String,
    pub step: usize,
    pub total: usize,
}

impl InstallStatus {
    fn initial() -> Self {
        Self {
            phase: Phase::Starting,
            message: "Preparing...".to_string(),
            step: 0,
            total: 0,
        }
    }
}

/// Create the status cell. Must happen before the writer is handed to the
/// background task.
pub fn status_channel() -> (StatusWriter, StatusReader) {
    let (tx, rx) = watch::channel(InstallStatus::initial());
    (StatusWriter { tx }, StatusReader { rx })
}

pub struct StatusWriter {
    tx: watch::Sender<InstallStatus>,
}

impl StatusWriter {
    pub fn set(&self, phase: Phase, message: impl Into<String>) {
        self.update(phase, message.into(), 0, 0);
    }

    pub fn progress(&self, phase: Phase, message: impl Into<String>, step: usize, total: usize) {
        self.update(phase, message.into(), step, total);
    }

    pub fn finish(&self, message: impl Into<String>) {
        self.set(Phase::Done, message);
    }

    pub fn fail(&self, message: impl Into<String>) {
        self.set(Phase::Failed, message);
    }

    fn update(&self, phase: Phase, message: String, step: usize, total: usize) {
        // Done/Failed are sticky.
        self.tx.send_if_modified(|current| {
            if current.phase.is_terminal() {
                return false;
            }
            *current = InstallStatus {
                phase,
                message,
                step,
                total,
            };
            true
        });
    }
}

#[derive(Clone)]
pub struct StatusReader {
    rx: watch::Receiver<InstallStatus>,
}

impl StatusReader {
    pub fn latest(&self) -> InstallStatus {
        self.rx.borrow().clone()
    }

    /// Terminal phase reached, or the writer is gone.
    pub fn is_finished(&self) -> bool {
        self.rx.borrow().phase.is_terminal() || self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sees_latest_value() {
        let (writer, reader) = status_channel();
        assert_eq!(reader.latest().phase, Phase::Starting);

        writer.progress(Phase::Packages, "Checking scrot", 1, 5);
        writer.progress(Phase::Packages, "Checking xclip", 3, 5);

        let status = reader.latest();
        assert_eq!(status.message, "Checking xclip");
        assert_eq!((status.step, status.total), (3, 5));
        assert!(!reader.is_finished());
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let (writer, reader) = status_channel();
        writer.fail("apt failed");
        writer.set(Phase::Keybinding, "late update");
        writer.finish("done");

        let status = reader.latest();
        assert_eq!(status.phase, Phase::Failed);
        assert_eq!(status.message, "apt failed");
        assert!(reader.is_finished());
    }

    #[test]
    fn test_readers_survive_writer_drop() {
        let (writer, reader) = status_channel();
        let second = reader.clone();
        writer.finish("Installation complete");
        drop(writer);
        assert_eq!(second.latest().phase, Phase::Done);
    }
}
