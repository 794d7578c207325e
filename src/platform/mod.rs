//! Platform glue
//!
//! Handles the host-facing side of the session:
//! - Frame clock (variable frame delta -> fixed 60 Hz ticks)
//! - Serializable view of a session for hosts that render it
//! - Browser bridge (wasm32 only)

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebSession;

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::sim::{CharacterSlot, GameSession, SessionState, Task, TickInput, TimerSnapshot};

/// Fixed-timestep accumulator
///
/// Frame deltas are clamped so a backgrounded tab can't replay a huge
/// backlog, and each frame runs at most `MAX_SUBSTEPS` ticks.
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
    input: TickInput,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &TickInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut TickInput {
        &mut self.input
    }

    /// Held inputs persist until changed
    pub fn set_intent(&mut self, intent: Vec2, sprint: bool) {
        self.input.intent = intent;
        self.input.sprint = sprint;
    }

    /// Queue an interact for the next tick
    pub fn press_interact(&mut self) {
        self.input.interact = true;
    }

    /// Queue a character switch for the next tick
    pub fn press_switch(&mut self, raw_id: u8) {
        self.input.switch_to = Some(raw_id);
    }

    /// Run as many ticks as `frame_dt` covers. Returns the tick count.
    pub fn advance(&mut self, session: &mut GameSession, frame_dt: f32) -> u32 {
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            session.tick(&self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs only reach the first tick
            self.input.clear_one_shots();
        }
        substeps
    }

    /// Drop any banked time and queued input
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.input = TickInput::default();
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView<'a> {
    pub state: &'a SessionState,
    pub timers: TimerSnapshot,
    pub characters: &'a [CharacterSlot],
    pub tasks: &'a [Task],
}

impl<'a> SessionView<'a> {
    pub fn of(session: &'a GameSession) -> Self {
        Self {
            state: session.state(),
            timers: session.timers().snapshot(),
            characters: session.characters(),
            tasks: session.tasks().all(),
        }
    }
}
