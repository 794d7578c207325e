//! Game session controller
//!
//! Owns the session state, the three character slots, the timer and task
//! systems, and the outstanding minigame (if any). All mutation goes
//! through here; the systems are called, never reached into.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::character::CharacterSlot;
use super::events::{EventBus, GameOverReason, SessionEvent, SessionObserver};
use super::ids::{CharacterId, TaskId};
use super::state::{SessionConfig, SessionError, SessionPhase, SessionState};
use super::task::TaskSystem;
use super::timer::{TimerEvent, TimerSystem};
use crate::consts::CHARACTER_COUNT;
use crate::minigame::{
    Mailbox, Minigame, MinigameContext, MinigameOutcome, MinigameProvider, MinigameResolution,
    MinigameResolver,
};

pub struct GameSession {
    pub(super) config: SessionConfig,
    pub(super) state: SessionState,
    pub(super) timers: TimerSystem,
    pub(super) tasks: TaskSystem,
    pub(super) characters: [CharacterSlot; CHARACTER_COUNT],
    minigames: Box<dyn MinigameProvider>,
    pub(super) minigame: Option<Box<dyn Minigame>>,
    mailbox: Mailbox,
    events: EventBus,
}

impl GameSession {
    /// Build a fresh session: clocks per the timer mode, level populated
    /// from the configured layout and seed
    pub fn new(config: SessionConfig, minigames: impl MinigameProvider + 'static) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let mut tasks = TaskSystem::new();
        config.layout.populate(&mut tasks, &mut rng);
        let spawns = config.layout.spawn_positions(&mut rng);
        let timers =
            TimerSystem::new(config.timer_mode).with_low_time_threshold(config.low_time_threshold);
        Self::from_parts(config, timers, tasks, spawns, minigames)
    }

    /// Build a session around prepared systems
    pub fn from_parts(
        config: SessionConfig,
        timers: TimerSystem,
        tasks: TaskSystem,
        spawns: [Vec2; CHARACTER_COUNT],
        minigames: impl MinigameProvider + 'static,
    ) -> Self {
        let characters = CharacterId::ALL.map(|id| CharacterSlot::new(id, spawns[id.index()]));

        let mut session = Self {
            config,
            state: SessionState::new(),
            timers,
            tasks,
            characters,
            minigames: Box::new(minigames),
            minigame: None,
            mailbox: Mailbox::new(),
            events: EventBus::new(),
        };
        session.characters[session.state.active.index()].active = true;

        log::info!(
            "Session started: {:?} timers, {} tasks, {} required",
            session.timers.mode(),
            session.tasks.len(),
            session.config.required_task_count
        );

        session.emit(SessionEvent::TimersUpdated {
            timers: session.timers.snapshot(),
        });
        session.emit(SessionEvent::CharacterSwitched {
            character_id: session.state.active,
        });
        session.refresh_proximity();
        session
    }

    // === Queries ===

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn active_character(&self) -> CharacterId {
        self.state.active
    }

    pub fn character(&self, id: CharacterId) -> &CharacterSlot {
        &self.characters[id.index()]
    }

    pub fn characters(&self) -> &[CharacterSlot] {
        &self.characters
    }

    pub fn timers(&self) -> &TimerSystem {
        &self.timers
    }

    pub fn tasks(&self) -> &TaskSystem {
        &self.tasks
    }

    pub fn completed_tasks(&self) -> u32 {
        self.state.completed_tasks
    }

    pub fn nearby_task(&self) -> Option<TaskId> {
        self.state.nearby_task
    }

    pub fn is_won(&self) -> bool {
        self.state.is_won()
    }

    pub fn is_lost(&self) -> bool {
        self.state.is_lost()
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase.is_terminal()
    }

    pub fn minigame_active(&self) -> bool {
        self.state.minigame_active()
    }

    /// Switching is only allowed while freely running
    pub fn can_switch(&self) -> bool {
        self.state.phase == SessionPhase::Running
    }

    pub fn can_interact(&self) -> bool {
        self.state.phase == SessionPhase::Running && self.scan_proximity().is_some()
    }

    /// The outstanding minigame, for hosts that feed it input
    pub fn minigame_mut(&mut self) -> Option<&mut (dyn Minigame + 'static)> {
        self.minigame.as_deref_mut()
    }

    // === Events ===

    pub fn subscribe(&mut self, observer: impl SessionObserver + 'static) {
        self.events.subscribe(Box::new(observer));
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain().collect()
    }

    pub(super) fn emit(&mut self, event: SessionEvent) {
        self.events.emit(event);
    }

    // === Signals ===

    /// Make `id` the active character. Clocks are left exactly as they are.
    pub fn switch_character(&mut self, id: CharacterId) -> Result<(), SessionError> {
        self.ensure_running()?;
        let previous = self.state.active;
        if previous == id {
            return Ok(());
        }

        let old = &mut self.characters[previous.index()];
        old.stop();
        old.active = false;
        self.characters[id.index()].active = true;
        self.state.active = id;

        log::debug!("Switched {} -> {}", previous, id);
        self.emit(SessionEvent::CharacterSwitched { character_id: id });
        self.refresh_proximity();
        Ok(())
    }

    /// Start the minigame for the task in range of the active character
    pub fn interact(&mut self) -> Result<TaskId, SessionError> {
        self.ensure_running()?;
        let task_id = self.scan_proximity().ok_or(SessionError::NoTaskInRange)?;
        let kind = self
            .tasks
            .kind_of(task_id)
            .ok_or(SessionError::UnknownTask(task_id.0))?;
        let mut game = self
            .minigames
            .create(kind)
            .ok_or(SessionError::NoMinigame(kind))?;

        let character_id = self.state.active;
        self.characters[character_id.index()].stop();
        self.state.phase = SessionPhase::MinigameActive {
            task_id,
            character_id,
        };

        log::info!("{} opened {} ({}) for {}", game.title(), task_id, kind.as_str(), character_id);
        self.emit(SessionEvent::MinigameStarted {
            task_id,
            character_id,
            kind,
        });

        let ctx = MinigameContext {
            task_id,
            character_id,
            kind,
        };
        // Fresh inbox per launch: late reports from earlier minigames go nowhere
        self.mailbox = Mailbox::new();
        game.start(ctx, MinigameResolver::new(ctx, self.mailbox.clone()));
        self.minigame = Some(game);

        // Minigames may resolve synchronously on start
        self.drain_resolutions();
        Ok(task_id)
    }

    /// Apply a minigame's result. Anything not matching the pending
    /// task/character pair is ignored.
    pub fn resolve_minigame(&mut self, resolution: MinigameResolution) -> Result<(), SessionError> {
        let (task_id, character_id) = match self.state.phase {
            SessionPhase::MinigameActive {
                task_id,
                character_id,
            } => (task_id, character_id),
            SessionPhase::Running => return Err(SessionError::MinigameIdle),
            SessionPhase::Won | SessionPhase::Lost { .. } => return Err(SessionError::Finished),
        };
        if resolution.task_id != task_id || resolution.character_id != character_id {
            return Err(SessionError::StaleResolution {
                task_id: resolution.task_id,
                character_id: resolution.character_id,
            });
        }

        self.close_minigame(task_id, resolution.outcome);

        if resolution.outcome == MinigameOutcome::Success {
            self.apply_completion(task_id, character_id);
        }
        Ok(())
    }

    /// Close the outstanding minigame without completing its task
    pub fn cancel_minigame(&mut self) -> Result<(), SessionError> {
        let (task_id, character_id) = self
            .state
            .pending_minigame()
            .ok_or(if self.is_finished() {
                SessionError::Finished
            } else {
                SessionError::MinigameIdle
            })?;
        self.resolve_minigame(MinigameResolution {
            task_id,
            character_id,
            outcome: MinigameOutcome::Abandoned,
        })
    }

    // === Internals ===

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.state.phase {
            SessionPhase::Running => Ok(()),
            SessionPhase::MinigameActive { .. } => Err(SessionError::MinigameActive),
            SessionPhase::Won | SessionPhase::Lost { .. } => Err(SessionError::Finished),
        }
    }

    pub(super) fn scan_proximity(&self) -> Option<TaskId> {
        let active = &self.characters[self.state.active.index()];
        self.tasks.find_within_radius(
            active.pos,
            self.config.proximity_radius,
            self.config.proximity_policy,
        )
    }

    pub(super) fn refresh_proximity(&mut self) {
        let nearby = self.scan_proximity();
        if nearby != self.state.nearby_task {
            self.state.nearby_task = nearby;
            self.emit(SessionEvent::ProximityChanged {
                nearby: nearby.is_some(),
                task_id: nearby,
            });
        }
    }

    /// Apply every resolution posted by minigames since the last drain
    pub(super) fn drain_resolutions(&mut self) {
        while let Some(resolution) = self.mailbox.take() {
            if let Err(err) = self.resolve_minigame(resolution) {
                log::debug!("Ignored minigame resolution: {err}");
            }
        }
    }

    fn close_minigame(&mut self, task_id: TaskId, outcome: MinigameOutcome) {
        // Dropping an unresolved oracle posts an abandon that will be stale
        self.minigame = None;
        if !self.is_finished() {
            self.state.phase = SessionPhase::Running;
        }
        self.emit(SessionEvent::MinigameClosed { task_id, outcome });
    }

    fn apply_completion(&mut self, task_id: TaskId, character_id: CharacterId) {
        if !self.tasks.complete(task_id, character_id) {
            log::debug!("{} was already complete", task_id);
            return;
        }
        self.state.completed_tasks += 1;

        if self.config.reset_timer_on_task_complete {
            let event = self.timers.reset(character_id);
            self.handle_timer_events(vec![event]);
        }

        self.emit(SessionEvent::TaskCompleted {
            task_id,
            character_id,
        });

        if self.config.win_enabled && self.state.completed_tasks >= self.config.required_task_count {
            self.win();
        }
    }

    pub(super) fn handle_timer_events(&mut self, events: Vec<TimerEvent>) {
        for event in events {
            match event {
                TimerEvent::Timeout(id) => self.timeout(id),
                TimerEvent::LowTime(id) => {
                    self.emit(SessionEvent::LowTimeWarning { character_id: id })
                }
                TimerEvent::Reset(id) => self.emit(SessionEvent::TimerReset { character_id: id }),
            }
        }
    }

    /// Latch a loss for any clock already at zero
    pub(super) fn check_expired(&mut self) {
        if !self.config.loss_enabled {
            return;
        }
        if let Some(id) = self.timers.first_expired() {
            self.timeout(id);
        }
    }

    fn timeout(&mut self, id: CharacterId) {
        if self.is_finished() {
            return;
        }
        if !self.config.loss_enabled {
            log::debug!("{} ran out of time (loss disabled)", id);
            return;
        }

        if let Some((task_id, _)) = self.state.pending_minigame() {
            self.close_minigame(task_id, MinigameOutcome::Abandoned);
        }
        self.state.phase = SessionPhase::Lost { character_id: id };
        self.stop_all();

        log::info!(
            "Game over: {} ran out of time after {:.1}s ({} tasks done)",
            id,
            self.state.elapsed,
            self.state.completed_tasks
        );
        self.emit(SessionEvent::GameOver {
            reason: GameOverReason::Timeout,
            character_id: id,
        });
    }

    fn win(&mut self) {
        if self.is_finished() {
            return;
        }
        self.state.phase = SessionPhase::Won;
        self.stop_all();

        log::info!(
            "Victory: {} tasks in {:.1}s",
            self.state.completed_tasks,
            self.state.elapsed
        );
        self.emit(SessionEvent::Victory {
            tasks_completed: self.state.completed_tasks,
            timers: self.timers.snapshot(),
        });
    }

    fn stop_all(&mut self) {
        for slot in &mut self.characters {
            slot.stop();
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("timers", &self.timers)
            .field("tasks", &self.tasks.len())
            .field("minigame", &self.minigame.as_ref().map(|m| m.kind()))
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::minigame::external_provider;
    use crate::sim::task::TaskKind;
    use crate::sim::timer::TimerMode;
    use crate::zone_offset_x;

    pub(crate) fn c(raw: u8) -> CharacterId {
        CharacterId::new(raw).unwrap()
    }

    pub(crate) fn spawn(id: CharacterId) -> Vec2 {
        Vec2::new(zone_offset_x(id.zone()) + 500.0, 384.0)
    }

    /// Session with characters at fixed spots; `near` tasks sit on top of
    /// the given character, `far` ones out of reach in the same zone
    pub(crate) fn session_with(
        config: SessionConfig,
        timers: TimerSystem,
        tasks: &[(TaskKind, CharacterId, bool)],
    ) -> GameSession {
        let mut registry = TaskSystem::new();
        for &(kind, owner, near) in tasks {
            let offset = if near { Vec2::ZERO } else { Vec2::new(300.0, 0.0) };
            registry.register(kind, spawn(owner) + offset, owner.zone());
        }
        let spawns = CharacterId::ALL.map(spawn);
        GameSession::from_parts(config, timers, registry, spawns, external_provider())
    }

    pub(crate) fn simple(tasks: &[(TaskKind, CharacterId, bool)]) -> GameSession {
        session_with(SessionConfig::default(), TimerSystem::default(), tasks)
    }

    fn success(task: u32, character: u8) -> MinigameResolution {
        MinigameResolution {
            task_id: TaskId(task),
            character_id: c(character),
            outcome: MinigameOutcome::Success,
        }
    }

    #[test]
    fn test_construction_events() {
        let mut session = simple(&[]);
        let events = session.drain_events();
        assert!(matches!(events[0], SessionEvent::TimersUpdated { .. }));
        assert_eq!(events[1], SessionEvent::CharacterSwitched { character_id: c(1) });
        assert_eq!(session.characters().iter().filter(|s| s.active).count(), 1);
    }

    #[test]
    fn test_new_populates_layout() {
        let session = GameSession::new(SessionConfig::default().with_seed(5), external_provider());
        assert_eq!(session.tasks().len(), 12);
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_assist_mode_initial_timers() {
        let config = SessionConfig {
            timer_mode: TimerMode::Assist,
            ..SessionConfig::default()
        };
        let session = GameSession::new(config, external_provider());
        for reading in session.timers().snapshot() {
            assert_eq!(reading.time_remaining, 50.0);
        }
    }

    #[test]
    fn test_switch_keeps_single_active() {
        let mut session = simple(&[]);
        for raw in [2, 3, 3, 1, 2] {
            session.switch_character(c(raw)).unwrap();
            assert_eq!(session.active_character(), c(raw));
            let active: Vec<u8> = session
                .characters()
                .iter()
                .filter(|s| s.active)
                .map(|s| s.id.get())
                .collect();
            assert_eq!(active, vec![raw]);
        }
    }

    #[test]
    fn test_switch_to_same_is_silent() {
        let mut session = simple(&[]);
        session.drain_events();
        session.switch_character(c(1)).unwrap();
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_interact_without_task_is_noop() {
        let mut session = simple(&[(TaskKind::Wire, c(1), false)]);
        session.drain_events();
        assert_eq!(session.interact(), Err(SessionError::NoTaskInRange));
        assert_eq!(session.phase(), SessionPhase::Running);
        assert!(
            !session
                .drain_events()
                .iter()
                .any(|e| matches!(e, SessionEvent::MinigameStarted { .. }))
        );
    }

    #[test]
    fn test_interact_starts_minigame() {
        let mut session = simple(&[(TaskKind::Golf, c(1), true)]);
        assert!(session.can_interact());
        assert_eq!(session.interact(), Ok(TaskId(1)));
        assert_eq!(
            session.phase(),
            SessionPhase::MinigameActive {
                task_id: TaskId(1),
                character_id: c(1)
            }
        );
        assert_eq!(session.minigame_mut().map(|m| m.kind()), Some(TaskKind::Golf));
        assert!(session.drain_events().contains(&SessionEvent::MinigameStarted {
            task_id: TaskId(1),
            character_id: c(1),
            kind: TaskKind::Golf,
        }));

        // Second interact and switching are both rejected
        assert_eq!(session.interact(), Err(SessionError::MinigameActive));
        assert_eq!(session.switch_character(c(2)), Err(SessionError::MinigameActive));
        assert_eq!(session.active_character(), c(1));
    }

    #[test]
    fn test_missing_minigame_rejects_interact() {
        let mut registry = TaskSystem::new();
        registry.register(TaskKind::Dino, spawn(c(1)), 0);
        let none = |_kind: TaskKind| -> Option<Box<dyn Minigame>> { None };
        let mut session = GameSession::from_parts(
            SessionConfig::default(),
            TimerSystem::default(),
            registry,
            CharacterId::ALL.map(spawn),
            none,
        );
        assert_eq!(session.interact(), Err(SessionError::NoMinigame(TaskKind::Dino)));
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_success_completes_once() {
        let mut session = simple(&[(TaskKind::Wire, c(1), true), (TaskKind::Card, c(1), false)]);
        session.interact().unwrap();
        session.resolve_minigame(success(1, 1)).unwrap();
        assert_eq!(session.completed_tasks(), 1);
        assert_eq!(session.tasks().completed_by(TaskId(1)), Some(c(1)));
        assert_eq!(session.phase(), SessionPhase::Running);

        // Replaying the same resolution changes nothing
        assert_eq!(session.resolve_minigame(success(1, 1)), Err(SessionError::MinigameIdle));
        assert_eq!(session.completed_tasks(), 1);
    }

    #[test]
    fn test_abandon_leaves_task_and_timers() {
        let mut session = simple(&[(TaskKind::Asteroid, c(1), true)]);
        session.interact().unwrap();
        let before = session.timers().snapshot();
        session.cancel_minigame().unwrap();

        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.completed_tasks(), 0);
        assert!(!session.tasks().get(TaskId(1)).unwrap().is_completed());
        assert_eq!(session.timers().snapshot(), before);
        assert!(session.drain_events().contains(&SessionEvent::MinigameClosed {
            task_id: TaskId(1),
            outcome: MinigameOutcome::Abandoned,
        }));
        // Task can be retried
        assert_eq!(session.interact(), Ok(TaskId(1)));
    }

    #[test]
    fn test_stale_resolution_ignored() {
        let mut session = simple(&[(TaskKind::Wire, c(1), true)]);
        session.interact().unwrap();
        assert!(matches!(
            session.resolve_minigame(success(1, 2)),
            Err(SessionError::StaleResolution { .. })
        ));
        assert!(matches!(
            session.resolve_minigame(success(9, 1)),
            Err(SessionError::StaleResolution { .. })
        ));
        assert!(session.minigame_active());
        assert_eq!(session.completed_tasks(), 0);
    }

    #[test]
    fn test_win_latches_at_threshold() {
        let config = SessionConfig {
            required_task_count: 2,
            ..SessionConfig::default()
        };
        let tasks = [
            (TaskKind::Wire, c(1), true),
            (TaskKind::Card, c(1), true),
            (TaskKind::Dino, c(1), true),
        ];
        let mut session = session_with(config, TimerSystem::default(), &tasks);

        session.interact().unwrap();
        session.resolve_minigame(success(1, 1)).unwrap();
        assert!(!session.is_won(), "one short of the threshold");

        session.interact().unwrap();
        session.resolve_minigame(success(2, 1)).unwrap();
        assert!(session.is_won());

        let victories = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::Victory { .. }))
            .count();
        assert_eq!(victories, 1);

        assert_eq!(session.interact(), Err(SessionError::Finished));
        assert_eq!(session.switch_character(c(2)), Err(SessionError::Finished));
    }

    #[test]
    fn test_reset_timer_on_complete() {
        let config = SessionConfig {
            reset_timer_on_task_complete: true,
            ..SessionConfig::default()
        };
        let timers = TimerSystem::with_remaining(TimerMode::Standard, [12.0, 35.0, 35.0]);
        let mut session = session_with(config, timers, &[(TaskKind::Telescope, c(1), true)]);
        session.interact().unwrap();
        session.resolve_minigame(success(1, 1)).unwrap();

        assert_eq!(session.timers().remaining(c(1)), 35.0);
        assert!(
            session
                .drain_events()
                .contains(&SessionEvent::TimerReset { character_id: c(1) })
        );
    }

    #[test]
    fn test_no_reset_by_default() {
        let timers = TimerSystem::with_remaining(TimerMode::Standard, [12.0, 35.0, 35.0]);
        let mut session =
            session_with(SessionConfig::default(), timers, &[(TaskKind::Card, c(1), true)]);
        session.interact().unwrap();
        session.resolve_minigame(success(1, 1)).unwrap();
        assert_eq!(session.timers().remaining(c(1)), 12.0);
    }

    #[test]
    fn test_switch_refreshes_proximity() {
        let mut session = simple(&[(TaskKind::Golf, c(2), true)]);
        session.drain_events();
        session.switch_character(c(2)).unwrap();
        assert_eq!(session.nearby_task(), Some(TaskId(1)));
        assert!(session.drain_events().contains(&SessionEvent::ProximityChanged {
            nearby: true,
            task_id: Some(TaskId(1)),
        }));
    }

    #[test]
    fn test_spawn_in_range_is_nearby_immediately() {
        let mut session = simple(&[(TaskKind::Wire, c(1), true)]);
        assert_eq!(session.nearby_task(), Some(TaskId(1)));
        assert!(session.can_interact());
        let events = session.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            SessionEvent::ProximityChanged {
                nearby: true,
                task_id: Some(TaskId(1)),
            }
        );
    }

    #[test]
    fn test_switch_zeroes_previous_intent() {
        let mut session = simple(&[]);
        let walk = crate::sim::tick::TickInput {
            intent: Vec2::Y,
            ..Default::default()
        };
        session.tick(&walk, 0.1);
        assert_eq!(session.character(c(1)).intent, Vec2::Y);

        session.switch_character(c(2)).unwrap();
        assert_eq!(session.character(c(1)).intent, Vec2::ZERO);
        assert!(!session.character(c(1)).is_moving());
    }

    #[test]
    fn test_configured_low_time_threshold() {
        let config = SessionConfig {
            low_time_threshold: 10.0,
            ..SessionConfig::default()
        };
        let mut session = GameSession::new(config, external_provider());
        assert_eq!(session.timers().low_time_threshold(), 10.0);
        session.drain_events();

        let idle = crate::sim::tick::TickInput::default();
        let warned = |events: &[SessionEvent]| {
            events
                .iter()
                .any(|e| matches!(e, SessionEvent::LowTimeWarning { .. }))
        };
        for _ in 0..24 {
            session.tick(&idle, 1.0);
        }
        assert!(!warned(&session.drain_events()));
        session.tick(&idle, 1.0);
        assert!(warned(&session.drain_events()));
    }

    #[test]
    fn test_timeout_without_loss_keeps_running() {
        let config = SessionConfig {
            loss_enabled: false,
            ..SessionConfig::default()
        };
        let timers = TimerSystem::with_remaining(TimerMode::Standard, [0.5, 0.0, 35.0]);
        let mut session = session_with(config, timers, &[]);
        let idle = crate::sim::tick::TickInput::default();
        for _ in 0..3 {
            session.tick(&idle, 1.0);
        }
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.timers().remaining(c(1)), 0.0);
        assert!(
            !session
                .drain_events()
                .iter()
                .any(|e| matches!(e, SessionEvent::GameOver { .. }))
        );
    }
}
