//! Environment-adaptive keybinding registration.
//!
//! Detects the desktop session, then registers a global shortcut either as
//! an xbindkeys file entry (X11 and generic sessions) or as a custom
//! keybinding slot in the GNOME settings database (GNOME on Wayland).

pub mod error;
pub mod keycombo;
pub mod registrar;
pub mod session;
pub mod settings_list;
pub mod traits;
pub mod types;

pub use error::{BackendError, RegistrationError, RegistrationResult};
pub use keycombo::{KeyCombo, KeyComboError};
pub use registrar::{KeybindingRegistrar, RegistrarOptions};
pub use session::{ProfileKind, SessionProfile, SessionType};
pub use settings_list::SettingsList;
pub use traits::{BindingDaemon, BindingFileWriter, SettingsStore};
pub use types::*;
