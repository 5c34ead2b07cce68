//! Polled progress display for the install task

use crate::status::{InstallStatus, Phase, StatusReader};
use std::io::{IsTerminal, Write};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";
const DIM: &str = "\x1b[2m";
const ACCENT: &str = "\x1b[38;5;39m";
const OK: &str = "\x1b[32m";
const ERR: &str = "\x1b[31m";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const BAR_WIDTH: usize = 20;
const BLOCK_WIDTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Redraw one animated line in place.
    Animated,
    /// One plain line per status change.
    Plain,
}

impl DisplayMode {
    pub fn detect(no_progress: bool) -> Self {
        if no_progress || !std::io::stdout().is_terminal() {
            DisplayMode::Plain
        } else {
            DisplayMode::Animated
        }
    }
}

/// Poll `reader` every [`POLL_INTERVAL`] until the install task finishes,
/// and return the final status.
pub async fn display(reader: StatusReader, mode: DisplayMode) -> InstallStatus {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut frame = 0usize;
    let mut last: Option<InstallStatus> = None;

    loop {
        ticker.tick().await;
        let status = reader.latest();
        let finished = reader.is_finished();

        match mode {
            DisplayMode::Animated => {
                let width = terminal_width();
                let line = if finished {
                    final_line(&status)
                } else {
                    render_line(&status, frame, width)
                };
                print!("{CLEAR_LINE}{line}");
                if finished {
                    println!();
                }
                std::io::stdout().flush().ok();
            }
            DisplayMode::Plain => {
                if last.as_ref() != Some(&status) {
                    println!("[{}] {}", status.phase.label(), status.message);
                }
            }
        }

        if finished {
            return status;
        }
        last = Some(status);
        frame = frame.wrapping_add(1);
    }
}

fn render_line(status: &InstallStatus, frame: usize, width: usize) -> String {
    let spinner = paint(SPINNER[frame % SPINNER.len()], ACCENT);
    let bar = if status.total > 0 {
        step_bar(status.step, status.total, BAR_WIDTH)
    } else {
        bouncing_bar(frame, BAR_WIDTH)
    };
    let label = paint(status.phase.label(), DIM);
    // spinner + spaces + bar + brackets + label
    let used = 1 + 1 + BAR_WIDTH + 2 + 1 + status.phase.label().chars().count() + 1;
    let message = truncate(&status.message, width.saturating_sub(used));
    format!("{spinner} {bar} {label} {message}")
}

fn final_line(status: &InstallStatus) -> String {
    match status.phase {
        Phase::Failed => format!("{} {}", paint("✗", ERR), status.message),
        Phase::Done => format!("{} {}", paint("✓", OK), status.message),
        _ => format!("{} {}", paint("!", ERR), "Install task stopped unexpectedly"),
    }
}

fn step_bar(step: usize, total: usize, width: usize) -> String {
    let filled = (step.min(total) * width) / total.max(1);
    format!(
        "[{}{}]",
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled))
    )
}

/// A block sliding back and forth across the bar.
fn bouncing_bar(frame: usize, width: usize) -> String {
    let travel = width.saturating_sub(BLOCK_WIDTH).max(1);
    let cycle = frame % (travel * 2);
    let offset = if cycle < travel { cycle } else { travel * 2 - cycle };
    let block = BLOCK_WIDTH.min(width);
    let after = width.saturating_sub(offset + block);
    format!(
        "[{}{}{}]",
        " ".repeat(offset.min(width)),
        "█".repeat(block),
        " ".repeat(after)
    )
}

fn paint(text: &str, style: &str) -> String {
    if color_enabled() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Cut `value` to at most `max` visible characters. Escape sequences are
/// kept and do not count, so a cut never splits one.
fn truncate(value: &str, max: usize) -> String {
    if visible_width(value) <= max {
        return value.to_string();
    }
    let keep = max.saturating_sub(1);
    let mut out = String::new();
    let mut visible = 0;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            out.push(ch);
            for next in chars.by_ref() {
                out.push(next);
                if next.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if visible == keep {
            break;
        }
        out.push(ch);
        visible += 1;
    }
    if max > 0 {
        out.push('…');
    }
    if out.contains('\x1b') {
        out.push_str(RESET);
    }
    out
}

fn visible_width(value: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in value.chars() {
        match (in_escape, ch) {
            (false, '\x1b') => in_escape = true,
            (false, _) => width += 1,
            (true, c) if c.is_ascii_alphabetic() => in_escape = false,
            (true, _) => {}
        }
    }
    width
}

/// Columns available for the status line, from `COLUMNS`.
fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&w| w > 0)
        .unwrap_or(80)
}

/// Log writer for stderr that erases the in-place status line before each
/// event, so log lines start at column 0. The next tick redraws the status.
#[derive(Debug, Clone, Copy)]
pub struct ClearLineStderr {
    enabled: bool,
}

impl ClearLineStderr {
    /// Clearing only happens when both streams are terminals.
    pub fn detect() -> Self {
        Self {
            enabled: std::io::stdout().is_terminal() && std::io::stderr().is_terminal(),
        }
    }
}

impl<'a> MakeWriter<'a> for ClearLineStderr {
    type Writer = ClearLine<std::io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        ClearLine::new(std::io::stderr(), self.enabled)
    }
}

/// Writes the erase-line sequence once, ahead of the first byte.
pub struct ClearLine<W: Write> {
    inner: W,
    pending: bool,
}

impl<W: Write> ClearLine<W> {
    pub fn new(inner: W, enabled: bool) -> Self {
        Self {
            inner,
            pending: enabled,
        }
    }
}

impl<W: Write> Write for ClearLine<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.pending && !buf.is_empty() {
            self.inner.write_all(CLEAR_LINE.as_bytes())?;
            self.pending = false;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::status_channel;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Checking scrot...", 40), "Checking scrot...");
        assert_eq!(truncate("Checking gnome-screenshot", 10), "Checking …");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_truncate_ignores_escape_sequences() {
        let styled = format!("{DIM}Packages{RESET} xclip");
        assert_eq!(visible_width(&styled), 14);
        assert_eq!(truncate(&styled, 14), styled);

        let cut = truncate(&styled, 5);
        assert_eq!(visible_width(&cut), 5);
        assert!(cut.starts_with(&format!("{DIM}Pack")));
        assert!(cut.ends_with(RESET));
    }

    #[test]
    fn test_clear_line_writes_erase_once() {
        let mut writer = ClearLine::new(Vec::new(), true);
        writer.write_all(b"WARN first").unwrap();
        writer.write_all(b"\n").unwrap();
        assert_eq!(writer.inner, b"\r\x1b[2KWARN first\n");

        let mut plain = ClearLine::new(Vec::new(), false);
        plain.write_all(b"WARN x\n").unwrap();
        assert_eq!(plain.inner, b"WARN x\n");
    }

    #[test]
    fn test_step_bar() {
        assert_eq!(step_bar(0, 4, 8), "[░░░░░░░░]");
        assert_eq!(step_bar(2, 4, 8), "[████░░░░]");
        assert_eq!(step_bar(9, 4, 8), "[████████]");
    }

    #[test]
    fn test_bouncing_bar_keeps_width() {
        for frame in 0..60 {
            let bar = bouncing_bar(frame, BAR_WIDTH);
            assert_eq!(bar.chars().count(), BAR_WIDTH + 2, "frame {frame}");
            assert_eq!(bar.matches('█').count(), BLOCK_WIDTH);
        }
    }

    #[tokio::test]
    async fn test_display_returns_final_status() {
        let (writer, reader) = status_channel();
        let task = tokio::spawn(async move {
            writer.set(Phase::Packages, "Checking scrot...");
            tokio::time::sleep(Duration::from_millis(150)).await;
            writer.finish("Installation complete");
        });

        let status = display(reader, DisplayMode::Plain).await;
        task.await.unwrap();
        assert_eq!(status.phase, Phase::Done);
        assert_eq!(status.message, "Installation complete");
    }

    #[tokio::test]
    async fn test_display_stops_when_writer_dropped() {
        let (writer, reader) = status_channel();
        writer.set(Phase::Keybinding, "Registering F1...");
        drop(writer);

        let status = display(reader, DisplayMode::Plain).await;
        assert_eq!(status.phase, Phase::Keybinding);
    }
}
