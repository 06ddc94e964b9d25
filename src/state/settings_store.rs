//! Settings Store
//!
//! Application preferences live apart from the project: they are read once at
//! startup, merged key-wise over the defaults and written back immediately on
//! every change. Updating settings never touches the project autosave.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};
use serde_json::Value;

use crate::error::Result;
use crate::model::{AppSettings, ColorRole, CustomTheme, ThemeName};
use crate::state::storage::{Storage, API_KEY_STORAGE_KEY, SETTINGS_STORAGE_KEY};

pub struct SettingsStore {
    settings: AppSettings,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.settings)
            .finish()
    }
}

impl SettingsStore {
    /// Read settings from storage. Missing keys take their defaults; an
    /// unreadable document yields the defaults.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let settings = match storage.get(SETTINGS_STORAGE_KEY) {
            Ok(Some(text)) => merge_with_defaults(&text).unwrap_or_else(|e| {
                warn!("Stored settings are unreadable, using defaults: {}", e);
                AppSettings::default()
            }),
            Ok(None) => AppSettings::default(),
            Err(e) => {
                warn!("Could not read settings, using defaults: {}", e);
                AppSettings::default()
            }
        };

        Self { settings, storage }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Replace the settings wholesale and persist them.
    ///
    /// Outside the crate, go through `Workspace::update_settings` so the
    /// project autosave follows the `autoSave` preference.
    pub(crate) fn update(&mut self, settings: AppSettings) {
        self.settings = settings;
        if let Err(e) = self.persist() {
            error!("Failed to save settings: {}", e);
        }
    }

    /// Apply a change to a copy of the current settings, then [`update`](Self::update).
    pub(crate) fn modify(&mut self, f: impl FnOnce(&mut AppSettings)) {
        let mut next = self.settings.clone();
        f(&mut next);
        self.update(next);
    }

    pub fn set_theme(&mut self, theme: ThemeName) {
        self.modify(|s| s.theme = theme);
    }

    /// Set one custom palette colour, creating the custom palette if needed.
    pub fn set_custom_color(&mut self, role: ColorRole, value: impl Into<String>) {
        let value = value.into();
        self.modify(|s| {
            s.custom_theme
                .get_or_insert_with(CustomTheme::default)
                .set(role, value)
        });
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        let language = language.into();
        self.modify(|s| s.language = language);
    }

    pub fn set_ai_enabled(&mut self, enabled: bool) {
        self.modify(|s| s.enable_ai = enabled);
    }

    fn persist(&self) -> Result<()> {
        let text = serde_json::to_string(&self.settings)?;
        self.storage.set(SETTINGS_STORAGE_KEY, &text)?;
        debug!("Saved settings");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // API key
    // ------------------------------------------------------------------------

    /// Store the generative-model API key; an empty key removes it.
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = sanitize_api_key(key);
        if key.is_empty() {
            self.storage.remove(API_KEY_STORAGE_KEY)
        } else {
            self.storage.set(API_KEY_STORAGE_KEY, &key)
        }
    }

    pub fn api_key(&self) -> Option<String> {
        match self.storage.get(API_KEY_STORAGE_KEY) {
            Ok(value) => value.map(|k| sanitize_api_key(&k)).filter(|k| !k.is_empty()),
            Err(e) => {
                warn!("Could not read API key: {}", e);
                None
            }
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }
}

/// Overlay stored keys on the default settings.
fn merge_with_defaults(text: &str) -> Result<AppSettings> {
    let stored: Value = serde_json::from_str(text)?;
    Ok(AppSettings::from_value(stored))
}

/// Trim whitespace and one layer of surrounding quotes.
pub fn sanitize_api_key(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
