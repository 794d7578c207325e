//! Minigame capability contract
//!
//! The session treats every minigame as an opaque oracle: it is started
//! with a context and a one-shot resolver, runs its own loop, and reports
//! exactly one outcome. What happens inside (wires, card swipes, golf) is
//! not the session's business.

mod stock;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::sim::{CharacterId, TaskId, TaskKind};

pub use stock::{ExternalMinigame, ScriptedMinigame, external_provider, scripted_provider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinigameOutcome {
    Success,
    Abandoned,
}

/// What a minigame is told when it starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinigameContext {
    pub task_id: TaskId,
    pub character_id: CharacterId,
    pub kind: TaskKind,
}

/// The single report a minigame sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinigameResolution {
    pub task_id: TaskId,
    pub character_id: CharacterId,
    pub outcome: MinigameOutcome,
}

/// Shared inbox of resolutions, drained by the session
#[derive(Debug, Clone, Default)]
pub struct Mailbox(Rc<RefCell<VecDeque<MinigameResolution>>>);

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    fn post(&self, resolution: MinigameResolution) {
        self.0.borrow_mut().push_back(resolution);
    }

    pub fn take(&self) -> Option<MinigameResolution> {
        self.0.borrow_mut().pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// One-shot handle for reporting a minigame's outcome.
///
/// Resolving consumes the handle, so a minigame cannot report twice.
/// Dropping it unresolved counts as abandoning.
#[derive(Debug)]
pub struct MinigameResolver {
    ctx: MinigameContext,
    mailbox: Option<Mailbox>,
}

impl MinigameResolver {
    pub fn new(ctx: MinigameContext, mailbox: Mailbox) -> Self {
        Self {
            ctx,
            mailbox: Some(mailbox),
        }
    }

    pub fn succeed(mut self) {
        self.send(MinigameOutcome::Success);
    }

    pub fn abandon(mut self) {
        self.send(MinigameOutcome::Abandoned);
    }

    fn send(&mut self, outcome: MinigameOutcome) {
        if let Some(mailbox) = self.mailbox.take() {
            mailbox.post(MinigameResolution {
                task_id: self.ctx.task_id,
                character_id: self.ctx.character_id,
                outcome,
            });
        }
    }
}

impl Drop for MinigameResolver {
    fn drop(&mut self) {
        self.send(MinigameOutcome::Abandoned);
    }
}

/// A self-contained scored challenge
pub trait Minigame {
    fn kind(&self) -> TaskKind;

    fn title(&self) -> &'static str {
        self.kind().title()
    }

    /// Begin the challenge. The minigame keeps the resolver until it
    /// has an outcome.
    fn start(&mut self, ctx: MinigameContext, resolver: MinigameResolver);

    /// Advance the minigame's own loop
    fn update(&mut self, _dt: f32) {}
}

/// Hands out a fresh minigame per task kind
pub trait MinigameProvider {
    /// `None` when no minigame exists for `kind`
    fn create(&mut self, kind: TaskKind) -> Option<Box<dyn Minigame>>;
}

impl<F> MinigameProvider for F
where
    F: FnMut(TaskKind) -> Option<Box<dyn Minigame>>,
{
    fn create(&mut self, kind: TaskKind) -> Option<Box<dyn Minigame>> {
        self(kind)
    }
}
