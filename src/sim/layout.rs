//! Level layouts and seeded population
//!
//! A layout is a table of task slots. Population turns it into concrete
//! positions using the session's seeded RNG, so a seed always yields the
//! same level.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ids::CharacterId;
use super::task::{TaskKind, TaskSystem};
use crate::consts::*;
use crate::{zone_height, zone_offset_x, zone_width};

/// Where a task goes inside its zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Random spot, kept away from previously placed tasks
    Scatter,
    /// Fixed fraction of the zone's width/height
    Fraction(f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskSlot {
    pub kind: TaskKind,
    pub zone: u8,
    pub placement: Placement,
}

const fn scatter(zone: u8, kind: TaskKind) -> TaskSlot {
    TaskSlot {
        kind,
        zone,
        placement: Placement::Scatter,
    }
}

const fn fixed(kind: TaskKind, fx: f32, fy: f32) -> TaskSlot {
    TaskSlot {
        kind,
        zone: 0,
        placement: Placement::Fraction(fx, fy),
    }
}

/// Twelve tasks, four per zone
pub const STANDARD_TASKS: [TaskSlot; 12] = [
    scatter(0, TaskKind::Wire),
    scatter(0, TaskKind::Asteroid),
    scatter(0, TaskKind::Dino),
    scatter(0, TaskKind::Card),
    scatter(1, TaskKind::Card),
    scatter(1, TaskKind::Golf),
    scatter(1, TaskKind::Telescope),
    scatter(1, TaskKind::Wire),
    scatter(2, TaskKind::Dino),
    scatter(2, TaskKind::Golf),
    scatter(2, TaskKind::Telescope),
    scatter(2, TaskKind::Asteroid),
];

/// One of each kind along a corridor in the first zone
pub const TUTORIAL_TASKS: [TaskSlot; 6] = [
    fixed(TaskKind::Wire, 0.15, 0.30),
    fixed(TaskKind::Card, 0.30, 0.35),
    fixed(TaskKind::Asteroid, 0.45, 0.30),
    fixed(TaskKind::Golf, 0.60, 0.35),
    fixed(TaskKind::Dino, 0.75, 0.30),
    fixed(TaskKind::Telescope, 0.90, 0.35),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Standard,
    Tutorial,
}

impl Layout {
    pub fn tasks(self) -> &'static [TaskSlot] {
        match self {
            Layout::Standard => &STANDARD_TASKS,
            Layout::Tutorial => &TUTORIAL_TASKS,
        }
    }

    /// Register every slot with `tasks`, in table order
    pub fn populate(self, tasks: &mut TaskSystem, rng: &mut Pcg32) {
        let mut placed: Vec<Vec2> = Vec::with_capacity(self.tasks().len());

        for slot in self.tasks() {
            let pos = match slot.placement {
                Placement::Scatter => scatter_position(slot.zone, &placed, rng),
                Placement::Fraction(fx, fy) => Vec2::new(
                    zone_offset_x(slot.zone) + zone_width() * fx,
                    zone_height() * fy,
                ),
            };
            placed.push(pos);
            tasks.register(slot.kind, pos, slot.zone);
        }

        log::debug!("{:?} layout populated with {} tasks", self, tasks.len());
    }

    /// Starting position for each character
    pub fn spawn_positions(self, rng: &mut Pcg32) -> [Vec2; CHARACTER_COUNT] {
        match self {
            Layout::Standard => CharacterId::ALL.map(|id| {
                let left = zone_offset_x(id.zone()) + SPAWN_MARGIN;
                let x = left + rng.random::<f32>() * (zone_width() - SPAWN_MARGIN * 2.0);
                Vec2::new(x, zone_height() / 2.0)
            }),
            Layout::Tutorial => CharacterId::ALL.map(|id| {
                Vec2::new(
                    zone_offset_x(id.zone()) + zone_width() * 0.05,
                    zone_height() * 0.35,
                )
            }),
        }
    }
}

/// Uniform spot inside the zone margin; retries until it clears every
/// placed task by `TASK_MIN_SPACING`, else keeps the last candidate
fn scatter_position(zone: u8, placed: &[Vec2], rng: &mut Pcg32) -> Vec2 {
    let left = zone_offset_x(zone) + SPAWN_MARGIN;
    let width = zone_width() - SPAWN_MARGIN * 2.0;
    let height = zone_height() - SPAWN_MARGIN * 2.0;

    let mut candidate = Vec2::ZERO;
    for _ in 0..TASK_PLACEMENT_ATTEMPTS {
        candidate = Vec2::new(
            left + rng.random::<f32>() * width,
            SPAWN_MARGIN + rng.random::<f32>() * height,
        );
        if placed.iter().all(|p| p.distance(candidate) >= TASK_MIN_SPACING) {
            break;
        }
    }
    candidate
}
