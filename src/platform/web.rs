//! Browser bridge
//!
//! JS owns rendering, audio and the minigame scenes. It pushes input in,
//! calls `frame` once per animation frame and pulls events and snapshots
//! back out as JSON strings.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::{FixedStep, SessionView};
use crate::minigame::{MinigameOutcome, MinigameResolution, external_provider};
use crate::sim::{GameSession, SessionConfig};
use crate::Settings;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Tripoint core loaded");
}

/// One play session driven from JS
#[wasm_bindgen]
pub struct WebSession {
    session: GameSession,
    clock: FixedStep,
}

#[wasm_bindgen]
impl WebSession {
    /// Build from a JSON `SessionConfig`; missing fields use defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WebSession, JsValue> {
        let config = if config_json.trim().is_empty() {
            SessionConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid session config: {e}")))?
        };
        Ok(Self::with_config(config))
    }

    /// Standard run using the player's saved settings and a fresh level
    #[wasm_bindgen(js_name = fromSettings)]
    pub fn from_settings() -> WebSession {
        let settings = Settings::load();
        Self::with_config(SessionConfig::from_settings(&settings).with_seed(clock_seed()))
    }

    /// Saved settings as JSON, defaults if nothing is stored
    #[wasm_bindgen(js_name = loadSettings)]
    pub fn load_settings() -> String {
        serde_json::to_string(&Settings::load()).unwrap_or_else(|e| {
            log::warn!("Failed to serialize settings: {}", e);
            "{}".to_string()
        })
    }

    /// Persist the settings screen's JSON; returns the stored form
    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings(json: &str) -> Result<String, JsValue> {
        let settings = Settings::store_json(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid settings: {e}")))?;
        serde_json::to_string(&settings).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn tutorial() -> WebSession {
        Self::with_config(SessionConfig::tutorial().with_seed(clock_seed()))
    }

    #[wasm_bindgen(js_name = setIntent)]
    pub fn set_intent(&mut self, x: f32, y: f32, sprint: bool) {
        self.clock.set_intent(Vec2::new(x, y), sprint);
    }

    pub fn interact(&mut self) {
        self.clock.press_interact();
    }

    #[wasm_bindgen(js_name = switchCharacter)]
    pub fn switch_character(&mut self, id: u8) {
        self.clock.press_switch(id);
    }

    /// Report the outcome of the open minigame scene
    #[wasm_bindgen(js_name = resolveMinigame)]
    pub fn resolve_minigame(&mut self, success: bool) -> Result<(), JsValue> {
        let (task_id, character_id) = self
            .session
            .state()
            .pending_minigame()
            .ok_or_else(|| JsValue::from_str("No minigame in progress"))?;
        let outcome = if success {
            MinigameOutcome::Success
        } else {
            MinigameOutcome::Abandoned
        };
        self.session
            .resolve_minigame(MinigameResolution {
                task_id,
                character_id,
                outcome,
            })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Advance by one animation frame. Returns the number of ticks run.
    pub fn frame(&mut self, dt_seconds: f32) -> u32 {
        self.clock.advance(&mut self.session, dt_seconds)
    }

    /// Events since the last call, as a JSON array
    #[wasm_bindgen(js_name = drainEvents)]
    pub fn drain_events(&mut self) -> String {
        let events = self.session.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Failed to serialize events: {}", e);
            "[]".to_string()
        })
    }

    /// Full session view as JSON
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&SessionView::of(&self.session)).unwrap_or_else(|e| {
            log::warn!("Failed to serialize snapshot: {}", e);
            "{}".to_string()
        })
    }

    #[wasm_bindgen(getter)]
    pub fn finished(&self) -> bool {
        self.session.is_finished()
    }

    #[wasm_bindgen(getter)]
    pub fn won(&self) -> bool {
        self.session.is_won()
    }
}

impl WebSession {
    fn with_config(config: SessionConfig) -> Self {
        Self {
            session: GameSession::new(config, external_provider()),
            clock: FixedStep::new(),
        }
    }
}

fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}
