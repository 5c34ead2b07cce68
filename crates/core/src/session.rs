//! Session detection - classifies the running desktop from XDG hints

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

pub const SESSION_TYPE_VAR: &str = "XDG_SESSION_TYPE";
pub const CURRENT_DESKTOP_VAR: &str = "XDG_CURRENT_DESKTOP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    X11,
    Wayland,
    Unknown,
}

impl SessionType {
    fn from_hint(hint: &str) -> Self {
        let lower = hint.to_lowercase();
        if lower.contains("wayland") {
            SessionType::Wayland
        } else if lower.contains("x11") {
            SessionType::X11
        } else {
            SessionType::Unknown
        }
    }
}

/// Which registration mechanism a session calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// GNOME on Wayland: custom keybindings live in the settings database.
    GnomeWayland,
    /// X11 and every other compositor: static xbindkeys file.
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProfile {
    pub session_type: SessionType,
    pub desktop_environment: String,
}

impl SessionProfile {
    pub fn kind(&self) -> ProfileKind {
        let gnome = self.desktop_environment.to_lowercase().contains("gnome");
        if self.session_type == SessionType::Wayland && gnome {
            ProfileKind::GnomeWayland
        } else {
            ProfileKind::Generic
        }
    }
}

impl fmt::Display for SessionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desktop = if self.desktop_environment.is_empty() {
            "unknown desktop"
        } else {
            &self.desktop_environment
        };
        write!(f, "{:?} / {} ({:?})", self.session_type, desktop, self.kind())
    }
}

/// Build a profile from the two raw hints. Never fails.
pub fn classify(session_hint: &str, desktop_hint: &str) -> SessionProfile {
    SessionProfile {
        session_type: SessionType::from_hint(session_hint.trim()),
        desktop_environment: desktop_hint.trim().to_string(),
    }
}

/// Read the hints from the process environment.
pub fn detect() -> SessionProfile {
    let session = env::var(SESSION_TYPE_VAR).unwrap_or_default();
    let desktop = env::var(CURRENT_DESKTOP_VAR).unwrap_or_default();
    classify(&session, &desktop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wayland_ubuntu_gnome() {
        let profile = classify("wayland", "ubuntu:GNOME");
        assert_eq!(profile.session_type, SessionType::Wayland);
        assert_eq!(profile.kind(), ProfileKind::GnomeWayland);
    }

    #[test]
    fn test_x11_is_generic_for_any_desktop() {
        for desktop in ["GNOME", "KDE", "", "ubuntu:GNOME"] {
            assert_eq!(classify("x11", desktop).kind(), ProfileKind::Generic);
        }
    }

    #[test]
    fn test_empty_hints_are_generic() {
        let profile = classify("", "");
        assert_eq!(profile.session_type, SessionType::Unknown);
        assert_eq!(profile.kind(), ProfileKind::Generic);
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert_eq!(classify("WAYLAND", "gnome-classic").kind(), ProfileKind::GnomeWayland);
        assert_eq!(classify("Wayland", "Gnome").kind(), ProfileKind::GnomeWayland);
    }

    #[test]
    fn test_wayland_other_compositors_are_generic() {
        assert_eq!(classify("wayland", "Hyprland").kind(), ProfileKind::Generic);
        assert_eq!(classify("wayland", "KDE").kind(), ProfileKind::Generic);
        assert_eq!(classify("wayland", "").kind(), ProfileKind::Generic);
    }

    #[test]
    fn test_malformed_hints() {
        let profile = classify("tty\0", "\n");
        assert_eq!(profile.kind(), ProfileKind::Generic);
    }
}
