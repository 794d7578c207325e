//! Per-character countdown clocks
//!
//! Only the active character's clock burns down. Each clock raises a
//! timeout once when it crosses zero and a low-time warning once per
//! crossing of the threshold; a reset re-arms the warning.

use serde::{Deserialize, Serialize};

use super::ids::CharacterId;
use crate::consts::*;

/// Timer duration policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Standard,
    /// Longer clocks for players who want less pressure
    Assist,
}

impl TimerMode {
    pub fn initial_duration(self) -> f32 {
        match self {
            TimerMode::Standard => INITIAL_TIME,
            TimerMode::Assist => ASSIST_MODE_TIME,
        }
    }

    pub fn from_assist(assist: bool) -> Self {
        if assist { TimerMode::Assist } else { TimerMode::Standard }
    }
}

/// Something a clock did during a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Timeout(CharacterId),
    LowTime(CharacterId),
    Reset(CharacterId),
}

/// Read-only view of one clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerReading {
    pub character_id: CharacterId,
    pub time_remaining: f32,
    pub is_active: bool,
}

pub type TimerSnapshot = [TimerReading; CHARACTER_COUNT];

#[derive(Debug, Clone)]
pub struct TimerSystem {
    mode: TimerMode,
    remaining: [f32; CHARACTER_COUNT],
    low_time_fired: [bool; CHARACTER_COUNT],
    low_time_threshold: f32,
}

impl TimerSystem {
    pub fn new(mode: TimerMode) -> Self {
        let mut timers = Self {
            mode,
            remaining: [0.0; CHARACTER_COUNT],
            low_time_fired: [false; CHARACTER_COUNT],
            low_time_threshold: LOW_TIME_THRESHOLD,
        };
        timers.initialize(mode);
        timers
    }

    /// Start from arbitrary clock values (values below zero are floored)
    pub fn with_remaining(mode: TimerMode, remaining: [f32; CHARACTER_COUNT]) -> Self {
        let mut timers = Self::new(mode);
        timers.remaining = remaining.map(|t| t.max(0.0));
        timers
    }

    pub fn with_low_time_threshold(mut self, threshold: f32) -> Self {
        self.low_time_threshold = threshold.max(0.0);
        self
    }

    /// Refill every clock for `mode`, discarding elapsed progress
    pub fn initialize(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.remaining = [mode.initial_duration(); CHARACTER_COUNT];
        self.low_time_fired = [false; CHARACTER_COUNT];
    }

    /// Change policy mid-session; same as `initialize`
    pub fn set_mode(&mut self, mode: TimerMode) {
        log::info!("Timer mode -> {:?}, clocks refilled", mode);
        self.initialize(mode);
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn low_time_threshold(&self) -> f32 {
        self.low_time_threshold
    }

    /// Burn `elapsed` seconds off the active character's clock
    pub fn advance(&mut self, elapsed: f32, active: CharacterId) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if !(elapsed > 0.0) {
            return events;
        }

        let i = active.index();
        let before = self.remaining[i];
        let after = (before - elapsed).max(0.0);
        self.remaining[i] = after;

        if before > 0.0 && after <= 0.0 {
            events.push(TimerEvent::Timeout(active));
        }

        if !self.low_time_fired[i]
            && before > self.low_time_threshold
            && after <= self.low_time_threshold
        {
            self.low_time_fired[i] = true;
            events.push(TimerEvent::LowTime(active));
        }

        events
    }

    /// Refill one clock and re-arm its warning
    pub fn reset(&mut self, id: CharacterId) -> TimerEvent {
        let i = id.index();
        self.remaining[i] = self.mode.initial_duration();
        self.low_time_fired[i] = false;
        TimerEvent::Reset(id)
    }

    pub fn remaining(&self, id: CharacterId) -> f32 {
        self.remaining[id.index()]
    }

    pub fn is_expired(&self, id: CharacterId) -> bool {
        self.remaining[id.index()] <= 0.0
    }

    /// Lowest id whose clock has run out
    pub fn first_expired(&self) -> Option<CharacterId> {
        CharacterId::ALL.into_iter().find(|&id| self.is_expired(id))
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        CharacterId::ALL.map(|id| {
            let time_remaining = self.remaining(id);
            TimerReading {
                character_id: id,
                time_remaining,
                is_active: time_remaining > 0.0,
            }
        })
    }
}

impl Default for TimerSystem {
    fn default() -> Self {
        Self::new(TimerMode::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(raw: u8) -> CharacterId {
        CharacterId::new(raw).unwrap()
    }

    #[test]
    fn test_initial_durations() {
        let standard = TimerSystem::new(TimerMode::Standard);
        let assist = TimerSystem::new(TimerMode::Assist);
        for id in CharacterId::ALL {
            assert_eq!(standard.remaining(id), 35.0);
            assert_eq!(assist.remaining(id), 50.0);
        }
    }

    #[test]
    fn test_advance_only_active() {
        let mut timers = TimerSystem::default();
        timers.advance(10.0, c(2));
        assert_eq!(timers.remaining(c(1)), 35.0);
        assert_eq!(timers.remaining(c(2)), 25.0);
        assert_eq!(timers.remaining(c(3)), 35.0);
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut timers = TimerSystem::default();
        let events = timers.advance(40.0, c(1));
        assert!(events.contains(&TimerEvent::Timeout(c(1))));
        assert_eq!(timers.remaining(c(1)), 0.0);

        let events = timers.advance(5.0, c(1));
        assert!(events.is_empty());
        assert_eq!(timers.remaining(c(1)), 0.0);
    }

    #[test]
    fn test_low_time_rearmed_by_reset() {
        let mut timers = TimerSystem::default();
        let mut warnings = 0;

        for events in [timers.advance(31.0, c(1)), timers.advance(1.0, c(1))] {
            warnings += events.iter().filter(|e| matches!(e, TimerEvent::LowTime(_))).count();
        }
        assert_eq!(warnings, 1);

        assert_eq!(timers.reset(c(1)), TimerEvent::Reset(c(1)));
        assert_eq!(timers.remaining(c(1)), 35.0);

        let events = timers.advance(31.0, c(1));
        warnings += events.iter().filter(|e| matches!(e, TimerEvent::LowTime(_))).count();
        assert_eq!(warnings, 2);
    }

    #[test]
    fn test_single_step_to_zero_raises_both() {
        let mut timers = TimerSystem::default();
        let events = timers.advance(100.0, c(3));
        assert_eq!(events, vec![TimerEvent::Timeout(c(3)), TimerEvent::LowTime(c(3))]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut timers = TimerSystem::new(TimerMode::Assist);
        timers.reset(c(2));
        timers.reset(c(2));
        assert_eq!(timers.remaining(c(2)), 50.0);
    }

    #[test]
    fn test_set_mode_discards_progress() {
        let mut timers = TimerSystem::default();
        timers.advance(20.0, c(1));
        timers.set_mode(TimerMode::Assist);
        assert_eq!(timers.mode(), TimerMode::Assist);
        assert!(CharacterId::ALL.iter().all(|&id| timers.remaining(id) == 50.0));
    }

    #[test]
    fn test_snapshot_order_and_activity() {
        let timers = TimerSystem::with_remaining(TimerMode::Standard, [3.0, 0.0, -2.0]);
        let snap = timers.snapshot();
        let ids: Vec<u8> = snap.iter().map(|r| r.character_id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(snap[0].is_active);
        assert!(!snap[1].is_active);
        assert_eq!(snap[2].time_remaining, 0.0);
        assert_eq!(timers.first_expired(), Some(c(2)));
    }

    #[test]
    fn test_non_positive_elapsed_is_noop() {
        let mut timers = TimerSystem::default();
        assert!(timers.advance(0.0, c(1)).is_empty());
        assert!(timers.advance(-3.0, c(1)).is_empty());
        assert!(timers.advance(f32::NAN, c(1)).is_empty());
        assert_eq!(timers.remaining(c(1)), 35.0);
    }

    proptest! {
        #[test]
        fn prop_never_negative_and_timeout_at_most_once(
            steps in proptest::collection::vec((0.0f32..8.0, 1u8..=3), 1..64)
        ) {
            let mut timers = TimerSystem::default();
            let mut timeouts = [0u32; 3];
            for (dt, raw) in steps {
                let active = c(raw);
                let before = timers.snapshot();
                for event in timers.advance(dt, active) {
                    if let TimerEvent::Timeout(id) = event {
                        timeouts[id.index()] += 1;
                    }
                }
                for id in CharacterId::ALL {
                    prop_assert!(timers.remaining(id) >= 0.0);
                    if id != active {
                        prop_assert_eq!(timers.remaining(id), before[id.index()].time_remaining);
                    }
                }
            }
            prop_assert!(timeouts.iter().all(|&n| n <= 1));
        }

        #[test]
        fn prop_low_time_at_most_once_without_reset(
            steps in proptest::collection::vec(0.0f32..4.0, 1..64)
        ) {
            let mut timers = TimerSystem::default();
            let mut warnings = 0;
            for dt in steps {
                warnings += timers
                    .advance(dt, c(1))
                    .iter()
                    .filter(|e| matches!(e, TimerEvent::LowTime(_)))
                    .count();
            }
            prop_assert!(warnings <= 1);
        }
    }
}
