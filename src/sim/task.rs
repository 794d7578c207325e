//! Task registry and proximity detection

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ids::{CharacterId, TaskId};

/// Closed set of task types; each maps to one minigame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Wire,
    Card,
    Asteroid,
    Golf,
    Dino,
    Telescope,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::Wire,
        TaskKind::Card,
        TaskKind::Asteroid,
        TaskKind::Golf,
        TaskKind::Dino,
        TaskKind::Telescope,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Wire => "wire",
            TaskKind::Card => "card",
            TaskKind::Asteroid => "asteroid",
            TaskKind::Golf => "golf",
            TaskKind::Dino => "dino",
            TaskKind::Telescope => "telescope",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wire" => Some(TaskKind::Wire),
            "card" => Some(TaskKind::Card),
            "asteroid" => Some(TaskKind::Asteroid),
            "golf" => Some(TaskKind::Golf),
            "dino" => Some(TaskKind::Dino),
            "telescope" => Some(TaskKind::Telescope),
            _ => None,
        }
    }

    /// Window title of the minigame behind this task
    pub fn title(&self) -> &'static str {
        match self {
            TaskKind::Wire => "Connect the Wires",
            TaskKind::Card => "Swipe Your Card",
            TaskKind::Asteroid => "Asteroid Shooter",
            TaskKind::Golf => "Mini Golf",
            TaskKind::Dino => "Dino Run",
            TaskKind::Telescope => "Align Telescope",
        }
    }
}

/// How the proximity scan picks among several tasks in range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProximityPolicy {
    /// First incomplete task in registration order
    #[default]
    FirstRegistered,
    /// Nearest incomplete task; ties go to the earlier registration
    Closest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub pos: Vec2,
    pub zone: u8,
    completed_by: Option<CharacterId>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.completed_by.is_some()
    }

    pub fn completed_by(&self) -> Option<CharacterId> {
        self.completed_by
    }
}

/// Owns every task for one session. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct TaskSystem {
    /// Registration order; `tasks[i].id == i + 1`
    tasks: Vec<Task>,
}

impl TaskSystem {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn register(&mut self, kind: TaskKind, pos: Vec2, zone: u8) -> TaskId {
        let id = TaskId(self.tasks.len() as u32 + 1);
        self.tasks.push(Task {
            id,
            kind,
            pos,
            zone,
            completed_by: None,
        });
        id
    }

    /// Incomplete task within `radius` of `pos`, picked per `policy`
    pub fn find_within_radius(
        &self,
        pos: Vec2,
        radius: f32,
        policy: ProximityPolicy,
    ) -> Option<TaskId> {
        let mut in_range = self
            .tasks
            .iter()
            .filter(|t| !t.is_completed())
            .map(|t| (t.id, t.pos.distance(pos)))
            .filter(|&(_, d)| d <= radius);

        match policy {
            ProximityPolicy::FirstRegistered => in_range.next().map(|(id, _)| id),
            ProximityPolicy::Closest => in_range
                .fold(None, |best: Option<(TaskId, f32)>, (id, d)| match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((id, d)),
                })
                .map(|(id, _)| id),
        }
    }

    /// Registration-order proximity scan
    pub fn nearest_within_radius(&self, pos: Vec2, radius: f32) -> Option<TaskId> {
        self.find_within_radius(pos, radius, ProximityPolicy::FirstRegistered)
    }

    /// Mark a task done. False if unknown or already completed.
    pub fn complete(&mut self, id: TaskId, character: CharacterId) -> bool {
        match self.get_mut(id) {
            Some(task) if !task.is_completed() => {
                task.completed_by = Some(character);
                true
            }
            _ => false,
        }
    }

    pub fn kind_of(&self, id: TaskId) -> Option<TaskKind> {
        self.get(id).map(|t| t.kind)
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.tasks.get(index)
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.tasks.get_mut(index)
    }

    pub fn completed_by(&self, id: TaskId) -> Option<CharacterId> {
        self.get(id).and_then(Task::completed_by)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn incomplete_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_completed()).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.len() - self.incomplete_count()
    }

    /// Incomplete tasks in a zone, registration order
    pub fn incomplete_in_zone(&self, zone: u8) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(move |t| t.zone == zone && !t.is_completed())
    }

    /// Mark everything incomplete again (between sessions only)
    pub fn reset(&mut self) {
        for task in &mut self.tasks {
            task.completed_by = None;
        }
    }
}
