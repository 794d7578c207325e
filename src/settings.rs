//! Player settings and preferences
//!
//! Persisted in LocalStorage, separately from any session. Only the
//! assist-mode flag reaches the session core; volumes are carried for the
//! audio layer.

use serde::{Deserialize, Serialize};

use crate::sim::TimerMode;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Longer clocks for every character
    pub assist_mode: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assist_mode: false,
            master_volume: 0.7,
            music_volume: 1.0,
            sfx_volume: 0.8,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "tripoint_settings";

    pub fn timer_mode(&self) -> TimerMode {
        TimerMode::from_assist(self.assist_mode)
    }

    /// Parse a stored blob, falling back to defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::clamped)
    }

    /// Validate a blob from the settings screen and persist it
    pub fn store_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings = Self::from_json(json)?;
        settings.save();
        Ok(settings)
    }

    /// Pull every volume into 0..=1
    pub fn clamped(mut self) -> Self {
        for volume in [&mut self.master_volume, &mut self.music_volume, &mut self.sfx_volume] {
            *volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        }
        self
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to write settings");
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(e) => log::warn!("Failed to serialize settings: {}", e),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
