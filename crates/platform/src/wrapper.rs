//! Capture wrapper script bound to the shortcut

use super::filesystem;
use super::PlatformResult;
use std::path::Path;

/// Render the wrapper: pick a capture tool for the session, save into
/// `screenshot_dir`, copy the image to the clipboard and notify.
pub fn render_script(screenshot_dir: &Path, title: &str) -> String {
    let dir = screenshot_dir.to_string_lossy().replace('"', "\\\"");
    let title = title.replace('"', "\\\"");
    format!(
        r#"#!/bin/bash
# {title} capture wrapper (generated by snapbind)

TIMESTAMP=$(date +%Y-%m-%d-%H-%M-%S)
DIR="{dir}"
FILE="$DIR/screenshot-$TIMESTAMP.png"

mkdir -p "$DIR"

if [ "$XDG_SESSION_TYPE" = "wayland" ]; then
    if command -v gnome-screenshot >/dev/null; then
        gnome-screenshot -a -f "$FILE"
    elif command -v grim >/dev/null && command -v slurp >/dev/null; then
        grim -g "$(slurp)" "$FILE"
    else
        notify-send "{title}" "No screenshot tool found (gnome-screenshot or grim)"
        exit 1
    fi
else
    if command -v scrot >/dev/null; then
        scrot -s "$FILE"
    else
        notify-send "{title}" "scrot not found"
        exit 1
    fi
fi

if [ -f "$FILE" ]; then
    if [ "$XDG_SESSION_TYPE" = "wayland" ] && command -v wl-copy >/dev/null; then
        wl-copy < "$FILE"
    elif command -v xclip >/dev/null; then
        xclip -selection clipboard -t image/png -i "$FILE"
    fi

    if command -v notify-send >/dev/null; then
        notify-send "{title}" "Screenshot saved and copied to clipboard"
    fi
fi
"#
    )
}

pub async fn write_script(path: &Path, screenshot_dir: &Path, title: &str) -> PlatformResult<()> {
    filesystem::write_executable(path, &render_script(screenshot_dir, title)).await?;
    tracing::info!("Screenshot script created at {}", path.display());
    Ok(())
}
