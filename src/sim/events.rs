//! Typed event stream from the session to presentation layers
//!
//! Events are fire-and-forget. Observers are called synchronously in
//! registration order, then the event is queued for pull-style consumers
//! (the browser bridge drains the queue once per frame).

use std::collections::VecDeque;

use serde::Serialize;

use super::ids::{CharacterId, TaskId};
use super::task::TaskKind;
use super::timer::TimerSnapshot;
use crate::minigame::MinigameOutcome;

/// Upper bound on undrained events before the oldest are dropped
pub const MAX_QUEUED_EVENTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOverReason {
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SessionEvent {
    /// Every clock, once per tick
    TimersUpdated { timers: TimerSnapshot },
    CharacterSwitched { character_id: CharacterId },
    /// Active character moved into or out of range of a task
    ProximityChanged {
        nearby: bool,
        task_id: Option<TaskId>,
    },
    TaskCompleted {
        task_id: TaskId,
        character_id: CharacterId,
    },
    LowTimeWarning { character_id: CharacterId },
    TimerReset { character_id: CharacterId },
    SprintEnergy {
        character_id: CharacterId,
        energy: f32,
        max: f32,
    },
    MinigameStarted {
        task_id: TaskId,
        character_id: CharacterId,
        kind: TaskKind,
    },
    MinigameClosed {
        task_id: TaskId,
        outcome: MinigameOutcome,
    },
    GameOver {
        reason: GameOverReason,
        character_id: CharacterId,
    },
    Victory {
        tasks_completed: u32,
        timers: TimerSnapshot,
    },
}

/// Push-style consumer of session events
pub trait SessionObserver {
    fn on_event(&mut self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionEvent),
{
    fn on_event(&mut self, event: &SessionEvent) {
        self(event)
    }
}

#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<SessionEvent>,
    observers: Vec<Box<dyn SessionObserver>>,
    dropped: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn emit(&mut self, event: SessionEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }

        if self.queue.len() >= MAX_QUEUED_EVENTS {
            self.queue.pop_front();
            if self.dropped == 0 {
                log::warn!("Event queue full ({MAX_QUEUED_EVENTS}); dropping oldest events");
            }
            self.dropped += 1;
        }
        self.queue.push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.queue.drain(..)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Events lost to the queue bound since construction
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &self.queue.len())
            .field("observers", &self.observers.len())
            .field("dropped", &self.dropped)
            .finish()
    }
}
