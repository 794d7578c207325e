//! Character slots: position, movement intent and sprint energy

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ids::CharacterId;
use crate::clamp_to_zone;
use crate::consts::*;

/// One trapped character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSlot {
    pub id: CharacterId,
    pub pos: Vec2,
    /// Direction the player is pushing, length <= 1
    pub intent: Vec2,
    pub active: bool,
    /// 0..=SPRINT_MAX_ENERGY
    pub sprint_energy: f32,
    /// Whether the last movement step used the sprint multiplier
    pub sprinting: bool,
}

impl CharacterSlot {
    pub fn new(id: CharacterId, pos: Vec2) -> Self {
        Self {
            id,
            pos: clamp_to_zone(pos, id.zone(), CHARACTER_SIZE / 2.0),
            intent: Vec2::ZERO,
            active: false,
            sprint_energy: SPRINT_MAX_ENERGY,
            sprinting: false,
        }
    }

    pub fn zone(&self) -> u8 {
        self.id.zone()
    }

    /// Store the requested direction; anything longer than unit is normalized
    pub fn set_intent(&mut self, intent: Vec2) {
        self.intent = if !intent.is_finite() {
            Vec2::ZERO
        } else if intent.length_squared() > 1.0 {
            intent.normalize()
        } else {
            intent
        };
    }

    pub fn stop(&mut self) {
        self.intent = Vec2::ZERO;
        self.sprinting = false;
    }

    pub fn is_moving(&self) -> bool {
        self.intent != Vec2::ZERO
    }

    /// Move along the intent, applying the sprint multiplier when allowed.
    /// Position stays inside the character's zone.
    pub fn integrate(&mut self, dt: f32, sprint_held: bool) {
        self.sprinting = self.is_moving() && sprint_held && self.sprint_energy > 0.0;
        let multiplier = if self.sprinting { SPRINT_MULTIPLIER } else { 1.0 };
        let step = self.intent * multiplier * CHARACTER_SPEED * dt;
        self.pos = clamp_to_zone(self.pos + step, self.zone(), CHARACTER_SIZE / 2.0);
    }

    /// Drain while sprinting, otherwise regenerate
    pub fn update_energy(&mut self, dt: f32) {
        if self.sprinting && self.sprint_energy > 0.0 {
            self.sprint_energy -= SPRINT_DRAIN_RATE * dt;
        } else {
            self.sprint_energy += SPRINT_REGEN_RATE * dt;
        }
        self.sprint_energy = self.sprint_energy.clamp(0.0, SPRINT_MAX_ENERGY);
    }
}
