//! Codec for the settings database's `as` (array of strings) text form.
//!
//! `gsettings get` prints either the typed empty marker `@as []`, a bare `[]`,
//! or a bracketed list of single-quoted strings:
//!
//! ```text
//! ['/org/gnome/.../custom0/', '/org/gnome/.../custom2/']
//! ```

use crate::error::{RegistrationError, RegistrationResult};
use std::fmt;

const TYPED_EMPTY: &str = "@as []";
const EMPTY: &str = "[]";

/// Ordered list of custom-keybinding slot paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsList {
    entries: Vec<String>,
}

impl SettingsList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// Append `path` as the last element. Returns false if it was already present.
    pub fn push(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            return false;
        }
        self.entries.push(path);
        true
    }

    /// Smallest `<base><n>/` not present in the list, scanning n = 0, 1, 2, ...
    pub fn next_free_slot(&self, base: &str) -> String {
        let mut index: usize = 0;
        loop {
            let candidate = slot_path(base, index);
            if !self.contains(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }
}

impl From<Vec<String>> for SettingsList {
    fn from(entries: Vec<String>) -> Self {
        let mut list = SettingsList::new();
        for entry in entries {
            list.push(entry);
        }
        list
    }
}

impl fmt::Display for SettingsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

pub fn slot_path(base: &str, index: usize) -> String {
    format!("{base}{index}/")
}

/// Parse the raw text printed by the settings database.
pub fn parse(raw: &str) -> RegistrationResult<SettingsList> {
    let trimmed = raw.trim();
    if trimmed == TYPED_EMPTY || trimmed == EMPTY {
        return Ok(SettingsList::new());
    }

    // `@as` only ever prefixes an empty array, but tolerate it on populated ones.
    let body = trimmed.strip_prefix("@as").map(str::trim_start).unwrap_or(trimmed);
    let inner = body
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| RegistrationError::MalformedList(trimmed.to_string()))?;

    let mut list = SettingsList::new();
    for element in inner.split(',') {
        let element = strip_quotes(element.trim());
        if element.is_empty() {
            continue;
        }
        list.push(element);
    }
    Ok(list)
}

/// Render the list in the form `gsettings set` accepts.
pub fn serialize(list: &SettingsList) -> String {
    let quoted = list
        .iter()
        .map(|entry| format!("'{entry}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{quoted}]")
}

fn strip_quotes(element: &str) -> &str {
    element
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/x/custom";

    #[test]
    fn test_parse_empty_markers() {
        assert!(parse("@as []").unwrap().is_empty());
        assert!(parse("[]").unwrap().is_empty());
        assert!(parse("  @as []\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_blank_interior() {
        assert!(parse("[   ]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_populated() {
        let list = parse("['/x/custom0/', '/x/custom2/']\n").unwrap();
        assert_eq!(list.as_slice(), &["/x/custom0/", "/x/custom2/"]);
    }

    #[test]
    fn test_parse_strips_one_quote_layer_only() {
        let list = parse("[''/x/custom0/'']").unwrap();
        assert_eq!(list.as_slice(), &["'/x/custom0/'"]);
    }

    #[test]
    fn test_parse_unquoted_elements() {
        let list = parse("[/a/, /b/]").unwrap();
        assert_eq!(list.as_slice(), &["/a/", "/b/"]);
    }

    #[test]
    fn test_parse_rejects_missing_brackets() {
        assert!(matches!(parse("'/a/'"), Err(RegistrationError::MalformedList(_))));
        assert!(matches!(parse("['/a/'"), Err(RegistrationError::MalformedList(_))));
        assert!(matches!(parse("'/a/']"), Err(RegistrationError::MalformedList(_))));
        assert!(matches!(parse(""), Err(RegistrationError::MalformedList(_))));
    }

    #[test]
    fn test_parse_keeps_brackets_inside_elements() {
        let list = parse("['/x/custom0/', '/x/a]b/']").unwrap();
        assert_eq!(list.as_slice(), &["/x/custom0/", "/x/a]b/"]);

        let list = parse("[[/a/]]").unwrap();
        assert_eq!(list.as_slice(), &["[/a/]"]);
    }

    #[test]
    fn test_serialize() {
        let list = SettingsList::from(vec!["/a/".to_string(), "/b/".to_string()]);
        assert_eq!(serialize(&list), "['/a/', '/b/']");
        assert_eq!(serialize(&SettingsList::new()), "[]");
    }

    #[test]
    fn test_serialize_parse_preserves_order() {
        let raw = "['/x/custom3/',   '/x/custom0/','/x/custom1/']";
        let reparsed = parse(&serialize(&parse(raw).unwrap())).unwrap();
        assert_eq!(
            reparsed.as_slice(),
            &["/x/custom3/", "/x/custom0/", "/x/custom1/"]
        );
        assert_eq!(
            serialize(&reparsed),
            "['/x/custom3/', '/x/custom0/', '/x/custom1/']"
        );
    }

    #[test]
    fn test_free_slot_on_empty_list() {
        let list = parse("@as []").unwrap();
        assert_eq!(list.next_free_slot(BASE), "/x/custom0/");
    }

    #[test]
    fn test_free_slot_fills_first_gap() {
        let list = parse("['/x/custom0/', '/x/custom2/']").unwrap();
        assert_eq!(list.next_free_slot(BASE), "/x/custom1/");
    }

    #[test]
    fn test_free_slot_after_contiguous_run() {
        let list = parse("['/x/custom1/', '/x/custom0/', '/x/custom2/']").unwrap();
        assert_eq!(list.next_free_slot(BASE), "/x/custom3/");
    }

    #[test]
    fn test_free_slot_ignores_foreign_entries() {
        let list = parse("['/other/path/', '/x/custom1/']").unwrap();
        assert_eq!(list.next_free_slot(BASE), "/x/custom0/");
    }

    #[test]
    fn test_push_appends_last_and_rejects_duplicates() {
        let mut list = parse("['/x/custom2/', '/x/custom0/']").unwrap();
        let slot = list.next_free_slot(BASE);
        assert!(list.push(slot.clone()));
        assert!(!list.push(slot));
        assert_eq!(
            list.as_slice(),
            &["/x/custom2/", "/x/custom0/", "/x/custom1/"]
        );
    }

    #[test]
    fn test_from_vec_drops_duplicates() {
        let list = SettingsList::from(vec!["/a/".into(), "/a/".into(), "/b/".into()]);
        assert_eq!(list.len(), 2);
    }
}
