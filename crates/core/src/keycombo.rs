//! Key combination parsing and per-mechanism rendering.
//!
//! Accepts `Ctrl+Shift+S`, `Super+Print`, a bare `F1`, or a GNOME
//! accelerator such as `<Control><Alt>m`.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyComboError {
    #[error("Empty key combination")]
    Empty,

    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("Missing key after modifiers in '{0}'")]
    MissingKey(String),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub key: String,
}

impl KeyCombo {
    pub fn parse(input: &str) -> Result<Self, KeyComboError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(KeyComboError::Empty);
        }
        if trimmed.starts_with('<') {
            return parse_accelerator(trimmed);
        }

        let parts: Vec<&str> = trimmed.split('+').map(str::trim).collect();
        let mut modifiers = Modifiers::default();
        let (key, mods) = match parts.split_last() {
            Some((key, mods)) => (*key, mods),
            None => return Err(KeyComboError::Empty),
        };
        for part in mods {
            apply_modifier(&mut modifiers, part)?;
        }
        validate_key(key, trimmed)?;

        Ok(Self {
            modifiers,
            key: key.to_string(),
        })
    }

    /// GNOME accelerator syntax, e.g. `<Control><Shift>s`.
    pub fn to_gnome_accelerator(&self) -> String {
        let mut out = String::new();
        if self.modifiers.ctrl {
            out.push_str("<Control>");
        }
        if self.modifiers.alt {
            out.push_str("<Alt>");
        }
        if self.modifiers.shift {
            out.push_str("<Shift>");
        }
        if self.modifiers.super_key {
            out.push_str("<Super>");
        }
        out.push_str(&self.keysym());
        out
    }

    /// xbindkeys key line, e.g. `Control+Shift + s`.
    pub fn to_xbindkeys(&self) -> String {
        let mut mods = Vec::new();
        if self.modifiers.ctrl {
            mods.push("Control");
        }
        if self.modifiers.alt {
            mods.push("Mod1");
        }
        if self.modifiers.shift {
            mods.push("Shift");
        }
        if self.modifiers.super_key {
            mods.push("Mod4");
        }
        if mods.is_empty() {
            self.keysym()
        } else {
            format!("{} + {}", mods.join("+"), self.keysym())
        }
    }

    fn keysym(&self) -> String {
        if self.key.chars().count() == 1 {
            self.key.to_lowercase()
        } else {
            self.key.clone()
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.modifiers.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.alt {
            parts.push("Alt".to_string());
        }
        if self.modifiers.shift {
            parts.push("Shift".to_string());
        }
        if self.modifiers.super_key {
            parts.push("Super".to_string());
        }
        parts.push(self.key.clone());
        write!(f, "{}", parts.join("+"))
    }
}

fn apply_modifier(modifiers: &mut Modifiers, name: &str) -> Result<(), KeyComboError> {
    match name.to_lowercase().as_str() {
        "ctrl" | "control" | "primary" => modifiers.ctrl = true,
        "alt" | "mod1" => modifiers.alt = true,
        "shift" => modifiers.shift = true,
        "super" | "meta" | "win" | "mod4" => modifiers.super_key = true,
        _ => return Err(KeyComboError::UnknownModifier(name.to_string())),
    }
    Ok(())
}

fn validate_key(key: &str, whole: &str) -> Result<(), KeyComboError> {
    if key.is_empty() {
        return Err(KeyComboError::MissingKey(whole.to_string()));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
    {
        return Err(KeyComboError::InvalidKey(key.to_string()));
    }
    Ok(())
}

fn parse_accelerator(input: &str) -> Result<KeyCombo, KeyComboError> {
    let mut modifiers = Modifiers::default();
    let mut rest = input;
    while let Some(stripped) = rest.strip_prefix('<') {
        let end = stripped
            .find('>')
            .ok_or_else(|| KeyComboError::InvalidKey(input.to_string()))?;
        apply_modifier(&mut modifiers, &stripped[..end])?;
        rest = &stripped[end + 1..];
    }
    validate_key(rest, input)?;
    Ok(KeyCombo {
        modifiers,
        key: rest.to_string(),
    })
}
