//! Minigames that ship with the core

use super::{Minigame, MinigameContext, MinigameOutcome, MinigameProvider, MinigameResolver};
use crate::sim::TaskKind;

/// Placeholder for a minigame that runs outside the core (in the browser).
///
/// It holds the resolver so the session sees an outstanding minigame; the
/// host reports the result through `GameSession::resolve_minigame`.
#[derive(Debug)]
pub struct ExternalMinigame {
    kind: TaskKind,
    resolver: Option<MinigameResolver>,
}

impl ExternalMinigame {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            resolver: None,
        }
    }
}

impl Minigame for ExternalMinigame {
    fn kind(&self) -> TaskKind {
        self.kind
    }

    fn start(&mut self, _ctx: MinigameContext, resolver: MinigameResolver) {
        // Kept alive and never used: dropping it would abandon immediately
        self.resolver = Some(resolver);
    }
}

/// Resolves with a fixed outcome after a fixed amount of play time
#[derive(Debug)]
pub struct ScriptedMinigame {
    kind: TaskKind,
    outcome: MinigameOutcome,
    duration: f32,
    elapsed: f32,
    resolver: Option<MinigameResolver>,
}

impl ScriptedMinigame {
    pub fn new(kind: TaskKind, outcome: MinigameOutcome, duration: f32) -> Self {
        Self {
            kind,
            outcome,
            duration: duration.max(0.0),
            elapsed: 0.0,
            resolver: None,
        }
    }

    fn try_finish(&mut self) {
        if self.elapsed < self.duration {
            return;
        }
        if let Some(resolver) = self.resolver.take() {
            match self.outcome {
                MinigameOutcome::Success => resolver.succeed(),
                MinigameOutcome::Abandoned => resolver.abandon(),
            }
        }
    }
}

impl Minigame for ScriptedMinigame {
    fn kind(&self) -> TaskKind {
        self.kind
    }

    fn start(&mut self, ctx: MinigameContext, resolver: MinigameResolver) {
        log::debug!("{} started for {} ({})", self.title(), ctx.character_id, ctx.task_id);
        self.elapsed = 0.0;
        self.resolver = Some(resolver);
        self.try_finish();
    }

    fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        self.try_finish();
    }
}

/// Every kind handled outside the core
pub fn external_provider() -> impl MinigameProvider {
    |kind: TaskKind| -> Option<Box<dyn Minigame>> { Some(Box::new(ExternalMinigame::new(kind))) }
}

/// Every kind resolves with `outcome` after `duration` seconds
pub fn scripted_provider(outcome: MinigameOutcome, duration: f32) -> impl MinigameProvider {
    move |kind: TaskKind| -> Option<Box<dyn Minigame>> {
        Some(Box::new(ScriptedMinigame::new(kind, outcome, duration)))
    }
}
