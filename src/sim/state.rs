//! Session configuration and aggregate state

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::{CharacterId, TaskId};
use super::layout::Layout;
use super::task::{ProximityPolicy, TaskKind};
use super::timer::TimerMode;
use crate::Settings;
use crate::consts::*;

/// Everything fixed at session construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub timer_mode: TimerMode,
    /// Remaining time at which the one-shot warning fires
    pub low_time_threshold: f32,
    /// Refill the completing character's clock on every task
    pub reset_timer_on_task_complete: bool,
    pub required_task_count: u32,
    pub proximity_radius: f32,
    pub proximity_policy: ProximityPolicy,
    /// Scales elapsed time before it reaches the clocks
    pub timer_rate: f32,
    /// Whether a timeout ends the session
    pub loss_enabled: bool,
    pub win_enabled: bool,
    pub layout: Layout,
    /// Level population seed
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timer_mode: TimerMode::Standard,
            low_time_threshold: LOW_TIME_THRESHOLD,
            reset_timer_on_task_complete: false,
            required_task_count: REQUIRED_TASKS,
            proximity_radius: PROXIMITY_RADIUS,
            proximity_policy: ProximityPolicy::FirstRegistered,
            timer_rate: 1.0,
            loss_enabled: true,
            win_enabled: true,
            layout: Layout::Standard,
            seed: 0,
        }
    }
}

impl SessionConfig {
    /// Forgiving practice run: slow clocks, no loss, six tasks
    pub fn tutorial() -> Self {
        Self {
            timer_mode: TimerMode::Assist,
            required_task_count: Layout::Tutorial.tasks().len() as u32,
            timer_rate: TUTORIAL_TIMER_RATE,
            loss_enabled: false,
            layout: Layout::Tutorial,
            ..Self::default()
        }
    }

    /// Standard run honoring the player's persisted preferences
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timer_mode: settings.timer_mode(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Controller state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionPhase {
    Running,
    /// A minigame is outstanding for this task/character pair
    MinigameActive {
        task_id: TaskId,
        character_id: CharacterId,
    },
    Won,
    Lost { character_id: CharacterId },
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Won | SessionPhase::Lost { .. })
    }
}

/// Aggregate owned by the controller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: SessionPhase,
    pub active: CharacterId,
    pub completed_tasks: u32,
    /// Task currently in range of the active character
    pub nearby_task: Option<TaskId>,
    /// Simulated seconds since the session started
    pub elapsed: f32,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Running,
            active: CharacterId::FIRST,
            completed_tasks: 0,
            nearby_task: None,
            elapsed: 0.0,
        }
    }

    pub fn is_won(&self) -> bool {
        self.phase == SessionPhase::Won
    }

    pub fn is_lost(&self) -> bool {
        matches!(self.phase, SessionPhase::Lost { .. })
    }

    pub fn minigame_active(&self) -> bool {
        matches!(self.phase, SessionPhase::MinigameActive { .. })
    }

    pub fn pending_minigame(&self) -> Option<(TaskId, CharacterId)> {
        match self.phase {
            SessionPhase::MinigameActive {
                task_id,
                character_id,
            } => Some((task_id, character_id)),
            _ => None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a signal was ignored. The session is unchanged on every error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session is over")]
    Finished,
    #[error("a minigame is already in progress")]
    MinigameActive,
    #[error("no minigame is in progress")]
    MinigameIdle,
    #[error("no task in range")]
    NoTaskInRange,
    #[error("no minigame available for {0:?} tasks")]
    NoMinigame(TaskKind),
    #[error("resolution for {task_id} by {character_id} does not match the pending minigame")]
    StaleResolution {
        task_id: TaskId,
        character_id: CharacterId,
    },
    #[error("unknown character id {0}")]
    UnknownCharacter(u8),
    #[error("unknown task id {0}")]
    UnknownTask(u32),
}
