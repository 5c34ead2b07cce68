//! XDG-compliant user directory resolution

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const USER_DIRS_FILE: &str = "user-dirs.dirs";
const PICTURES_KEY: &str = "XDG_PICTURES_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDirectories {
    pub home: PathBuf,
    pub config: PathBuf,
    pub pictures: PathBuf,
}

impl UserDirectories {
    pub fn discover() -> Self {
        let home = PathBuf::from(env::var("HOME").unwrap_or_else(|_| "/home/user".into()));
        let config = env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".config"));
        Self::from_parts(home, config)
    }

    pub fn from_parts(home: PathBuf, config: PathBuf) -> Self {
        let pictures = fs::read_to_string(config.join(USER_DIRS_FILE))
            .ok()
            .and_then(|content| user_dir_entry(&content, PICTURES_KEY))
            .map(|raw| resolve_user_dir(&raw, &home))
            .unwrap_or_else(|| home.join("Pictures"));
        Self {
            home,
            config,
            pictures,
        }
    }

    pub fn autostart(&self) -> PathBuf {
        self.config.join("autostart")
    }

    /// Expand a leading `~` or `$HOME` against this home directory.
    pub fn expand(&self, raw: &str) -> PathBuf {
        if raw == "~" || raw == "$HOME" {
            return self.home.clone();
        }
        if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("$HOME/")) {
            return self.home.join(rest);
        }
        PathBuf::from(raw)
    }
}

/// Raw value of `key` in a `user-dirs.dirs` file. The last assignment wins,
/// as when the file is sourced by a shell.
fn user_dir_entry(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter(|(name, _)| name.trim() == key)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
        .last()
}

/// Entries are either `$HOME/...` or absolute; anything else is taken
/// relative to home.
fn resolve_user_dir(raw: &str, home: &Path) -> PathBuf {
    match raw.strip_prefix("$HOME") {
        Some(rest) => home.join(rest.trim_start_matches('/')),
        None if raw.starts_with('/') => PathBuf::from(raw),
        None => home.join(raw),
    }
}
