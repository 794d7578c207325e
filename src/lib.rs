//! Tripoint - three trapped characters, three clocks, one player
//!
//! Core modules:
//! - `sim`: Session core (timers, tasks, characters, controller state machine)
//! - `minigame`: Minigame capability contract and stock oracles
//! - `platform`: Frame clock and the browser bridge
//! - `settings`: Coarse persisted preferences

pub mod minigame;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{GameSession, SessionConfig, SessionEvent, TickInput};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the clock will accept (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Timer durations (seconds)
    pub const INITIAL_TIME: f32 = 35.0;
    pub const ASSIST_MODE_TIME: f32 = 50.0;
    pub const LOW_TIME_THRESHOLD: f32 = 5.0;

    /// Interaction radius around a task (pixels)
    pub const PROXIMITY_RADIUS: f32 = 48.0;
    /// Tasks needed to escape
    pub const REQUIRED_TASKS: u32 = 12;

    /// Number of trapped characters (and zones)
    pub const CHARACTER_COUNT: usize = 3;
    /// Walking speed (pixels/s)
    pub const CHARACTER_SPEED: f32 = 150.0;
    /// Character footprint, used to keep sprites inside their zone
    pub const CHARACTER_SIZE: f32 = 40.0;

    /// Sprint tuning
    pub const SPRINT_MULTIPLIER: f32 = 1.8;
    pub const SPRINT_MAX_ENERGY: f32 = 100.0;
    pub const SPRINT_DRAIN_RATE: f32 = 30.0;
    pub const SPRINT_REGEN_RATE: f32 = 15.0;

    /// Map geometry (tiles)
    pub const TILE_SIZE: f32 = 32.0;
    pub const ZONE_WIDTH_TILES: f32 = 32.0;
    pub const ZONE_HEIGHT_TILES: f32 = 24.0;
    pub const ZONE_SPACING_TILES: f32 = 2.0;

    /// Level population
    pub const SPAWN_MARGIN: f32 = 100.0;
    pub const TASK_MIN_SPACING: f32 = 150.0;
    pub const TASK_PLACEMENT_ATTEMPTS: u32 = 50;

    /// Tutorial clock runs at 30% speed
    pub const TUTORIAL_TIMER_RATE: f32 = 0.3;
}

/// Zone width in pixels
#[inline]
pub fn zone_width() -> f32 {
    consts::ZONE_WIDTH_TILES * consts::TILE_SIZE
}

/// Zone height in pixels
#[inline]
pub fn zone_height() -> f32 {
    consts::ZONE_HEIGHT_TILES * consts::TILE_SIZE
}

/// Left edge of a zone in world space (zones are laid out left to right)
#[inline]
pub fn zone_offset_x(zone: u8) -> f32 {
    let spacing = consts::ZONE_SPACING_TILES * consts::TILE_SIZE;
    zone as f32 * (zone_width() + spacing)
}

/// Clamp a world position into a zone, inset by `inset` on every side
pub fn clamp_to_zone(pos: Vec2, zone: u8, inset: f32) -> Vec2 {
    let left = zone_offset_x(zone);
    Vec2::new(
        pos.x.clamp(left + inset, left + zone_width() - inset),
        pos.y.clamp(inset, zone_height() - inset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_offsets() {
        assert_eq!(zone_offset_x(0), 0.0);
        assert_eq!(zone_offset_x(1), 1024.0 + 64.0);
        assert_eq!(zone_offset_x(2), 2.0 * (1024.0 + 64.0));
    }

    #[test]
    fn test_clamp_to_zone() {
        let p = clamp_to_zone(Vec2::new(-50.0, 9000.0), 1, 20.0);
        assert_eq!(p.x, zone_offset_x(1) + 20.0);
        assert_eq!(p.y, zone_height() - 20.0);

        let inside = Vec2::new(zone_offset_x(2) + 300.0, 200.0);
        assert_eq!(clamp_to_zone(inside, 2, 20.0), inside);
    }
}
