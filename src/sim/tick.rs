//! Per-tick session procedure
//!
//! One call advances the whole session by `dt` seconds: the active clock,
//! the active character's movement and sprint, proximity, and the
//! outstanding minigame. Clocks keep running while a minigame is open.

use glam::Vec2;

use super::events::SessionEvent;
use super::ids::CharacterId;
use super::session::GameSession;
use super::state::SessionPhase;
use crate::consts::SPRINT_MAX_ENERGY;

/// Input sampled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement direction for the active character
    pub intent: Vec2,
    /// Sprint modifier held
    pub sprint: bool,
    /// Interact pressed this tick (edge-triggered)
    pub interact: bool,
    /// Switch to this character (raw id, validated)
    pub switch_to: Option<u8>,
}

impl TickInput {
    /// Drop the edge-triggered parts after they have been consumed
    pub fn clear_one_shots(&mut self) {
        self.interact = false;
        self.switch_to = None;
    }
}

impl GameSession {
    /// Advance the session by one step
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if self.is_finished() {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.drain_resolutions();

        if let Some(raw) = input.switch_to {
            let result = match CharacterId::new(raw) {
                Some(id) => self.switch_character(id),
                None => Err(super::state::SessionError::UnknownCharacter(raw)),
            };
            if let Err(err) = result {
                log::debug!("Ignored switch to {raw}: {err}");
            }
        }
        if self.is_finished() {
            return;
        }

        self.state.elapsed += dt;

        // Clocks first: a timeout this tick ends the session before anything moves
        let active = self.state.active;
        let events = self.timers.advance(dt * self.config.timer_rate, active);
        self.handle_timer_events(events);
        self.check_expired();

        match self.state.phase {
            SessionPhase::Running => {
                let slot = &mut self.characters[active.index()];
                slot.set_intent(input.intent);
                slot.integrate(dt, input.sprint);

                self.refresh_proximity();

                let slot = &mut self.characters[active.index()];
                slot.update_energy(dt);
                let energy = slot.sprint_energy;
                self.emit(SessionEvent::SprintEnergy {
                    character_id: active,
                    energy,
                    max: SPRINT_MAX_ENERGY,
                });

                if input.interact {
                    if let Err(err) = self.interact() {
                        log::debug!("Ignored interact: {err}");
                    }
                }
            }
            SessionPhase::MinigameActive { .. } => {
                if let Some(game) = self.minigame.as_mut() {
                    game.update(dt);
                }
                self.drain_resolutions();
            }
            SessionPhase::Won | SessionPhase::Lost { .. } => {}
        }

        self.emit(SessionEvent::TimersUpdated {
            timers: self.timers.snapshot(),
        });
    }
}
