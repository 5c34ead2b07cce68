use crate::error::{RegistrationError, RegistrationResult};
use crate::keycombo::KeyCombo;
use crate::session::{ProfileKind, SessionProfile};
use crate::settings_list::{self, SettingsList};
use crate::traits::{BindingDaemon, BindingFileWriter, SettingsStore};
use crate::types::{BindingSpec, RegisteredBinding, RegistrationOutcome, RegistrationState};
use std::sync::Arc;

pub const MEDIA_KEYS_SCHEMA: &str = "org.gnome.settings-daemon.plugins.media-keys";
pub const CUSTOM_KEYBINDINGS_KEY: &str = "custom-keybindings";
pub const CUSTOM_KEYBINDING_SCHEMA: &str =
    "org.gnome.settings-daemon.plugins.media-keys.custom-keybinding";
pub const CUSTOM_KEYBINDING_BASE: &str =
    "/org/gnome/settings-daemon/plugins/media-keys/custom-keybindings/custom";

/// Where the settings database keeps custom keybindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarOptions {
    pub schema: String,
    pub list_key: String,
    /// Relocatable schema each slot is an instance of.
    pub slot_schema: String,
    /// Slot paths are `<slot_base><n>/`.
    pub slot_base: String,
    /// Upper bound on re-reads when the list changes under us.
    pub max_attempts: u32,
}

impl Default for RegistrarOptions {
    fn default() -> Self {
        Self {
            schema: MEDIA_KEYS_SCHEMA.to_string(),
            list_key: CUSTOM_KEYBINDINGS_KEY.to_string(),
            slot_schema: CUSTOM_KEYBINDING_SCHEMA.to_string(),
            slot_base: CUSTOM_KEYBINDING_BASE.to_string(),
            max_attempts: 3,
        }
    }
}

pub struct KeybindingRegistrar {
    store: Arc<dyn SettingsStore>,
    file_writer: Arc<dyn BindingFileWriter>,
    daemon: Arc<dyn BindingDaemon>,
    options: RegistrarOptions,
}

impl KeybindingRegistrar {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        file_writer: Arc<dyn BindingFileWriter>,
        daemon: Arc<dyn BindingDaemon>,
    ) -> Self {
        Self::with_options(store, file_writer, daemon, RegistrarOptions::default())
    }

    pub fn with_options(
        store: Arc<dyn SettingsStore>,
        file_writer: Arc<dyn BindingFileWriter>,
        daemon: Arc<dyn BindingDaemon>,
        options: RegistrarOptions,
    ) -> Self {
        Self {
            store,
            file_writer,
            daemon,
            options,
        }
    }

    /// Register `spec` using the mechanism `profile` calls for.
    ///
    /// Errors never escape: an unreachable settings backend yields
    /// `Skipped`, everything else `Failed`.
    pub async fn register(
        &self,
        profile: &SessionProfile,
        spec: &BindingSpec,
    ) -> RegistrationOutcome {
        tracing::info!(
            "Registering '{}' for {} on {}",
            spec.key_combo,
            spec.display_name,
            profile
        );

        let result = match KeyCombo::parse(&spec.key_combo) {
            Ok(combo) => match profile.kind() {
                ProfileKind::Generic => self.register_static(spec, &combo).await,
                ProfileKind::GnomeWayland => self.register_settings_slot(spec, &combo).await,
            },
            Err(e) => Err(e.into()),
        };

        let outcome = RegistrationOutcome::from(result);
        match &outcome {
            RegistrationOutcome::Registered(binding) => {
                tracing::info!("Keybinding registered: {}", binding)
            }
            RegistrationOutcome::Skipped(reason) => {
                tracing::warn!("Keybinding registration skipped: {}", reason)
            }
            RegistrationOutcome::Failed(reason) => {
                tracing::warn!("Keybinding registration failed: {}", reason)
            }
        }
        outcome
    }

    async fn register_static(
        &self,
        spec: &BindingSpec,
        combo: &KeyCombo,
    ) -> RegistrationResult<RegisteredBinding> {
        let file = self
            .file_writer
            .write_binding(spec, combo)
            .await
            .map_err(RegistrationError::BindingFile)?;
        tracing::debug!("Wrote binding file {}", file.display());

        self.daemon
            .restart()
            .await
            .map_err(RegistrationError::Daemon)?;

        Ok(RegisteredBinding::StaticFile { file })
    }

    async fn register_settings_slot(
        &self,
        spec: &BindingSpec,
        combo: &KeyCombo,
    ) -> RegistrationResult<RegisteredBinding> {
        tracing::debug!(
            "{:?}: {}:{}",
            RegistrationState::Unstarted,
            self.options.schema,
            self.options.list_key
        );
        let path = self.claim_slot().await?;

        let target = format!("{}:{}", self.options.slot_schema, path);
        let fields = [
            ("name", gvariant_string(&spec.display_name)),
            ("command", gvariant_string(&spec.command)),
            ("binding", gvariant_string(&combo.to_gnome_accelerator())),
        ];

        // The slot is already in the list; a failed field leaves it half-filled.
        let mut failed = Vec::new();
        for (field, value) in &fields {
            if let Err(e) = self.store.write(&target, field, value).await {
                tracing::warn!("Failed to write {} for {}: {}", field, path, e);
                failed.push((*field).to_string());
            }
        }
        if !failed.is_empty() {
            return Err(RegistrationError::PartialWrite {
                path,
                fields: failed,
            });
        }
        tracing::debug!("{:?}: {}", RegistrationState::FieldsWritten, path);

        // The same key must not also be grabbed by a leftover X11 daemon.
        if let Err(e) = self.daemon.stop().await {
            tracing::debug!("Binding daemon not stopped: {}", e);
        }

        Ok(RegisteredBinding::SettingsSlot { path })
    }

    /// Allocate a free slot and publish the extended list.
    ///
    /// The list is re-read right before the whole-list replace; if it no
    /// longer matches the snapshot the slot is recomputed from the fresh copy.
    async fn claim_slot(&self) -> RegistrationResult<String> {
        let attempts = self.options.max_attempts.max(1);
        let mut snapshot = self.read_list().await?;
        tracing::debug!(
            "{:?}: {} existing entries",
            RegistrationState::ListRead,
            snapshot.len()
        );

        for attempt in 1..=attempts {
            let path = snapshot.next_free_slot(&self.options.slot_base);
            tracing::debug!("{:?}: {} (attempt {})", RegistrationState::SlotChosen, path, attempt);

            let mut updated = snapshot.clone();
            updated.push(path.clone());

            let current = self.read_list().await?;
            if current != snapshot {
                tracing::warn!(
                    "Keybinding list changed during registration (attempt {}/{})",
                    attempt,
                    attempts
                );
                snapshot = current;
                continue;
            }

            self.store
                .write(
                    &self.options.schema,
                    &self.options.list_key,
                    &settings_list::serialize(&updated),
                )
                .await
                .map_err(RegistrationError::ListWrite)?;
            tracing::debug!("{:?}: {} entries", RegistrationState::ListWritten, updated.len());
            return Ok(path);
        }

        Err(RegistrationError::ListChanged { attempts })
    }

    async fn read_list(&self) -> RegistrationResult<SettingsList> {
        let raw = self
            .store
            .read(&self.options.schema, &self.options.list_key)
            .await
            .map_err(RegistrationError::BackendUnavailable)?;
        settings_list::parse(&raw)
    }
}

/// Quote a string as a GVariant text literal.
pub fn gvariant_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}
