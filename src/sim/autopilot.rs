//! Attract-mode bot
//!
//! Produces the input a reasonable player would give: walk the active
//! character to the next task in its zone, interact on arrival, and hop
//! to another character once this zone is done or the clock is nearly out.

use super::ids::CharacterId;
use super::session::GameSession;
use super::tick::TickInput;
use crate::consts::LOW_TIME_THRESHOLD;

/// Don't burn sprint on the last few steps
const SPRINT_MIN_DISTANCE: f32 = 120.0;

pub fn drive(session: &GameSession) -> TickInput {
    let mut input = TickInput::default();
    if !session.can_switch() {
        return input;
    }

    let active = session.active_character();
    let slot = session.character(active);
    let remaining = session.timers().remaining(active);

    if session.nearby_task().is_some() {
        input.interact = true;
        return input;
    }

    let candidate = best_switch_target(session, active);
    let running_out = remaining < LOW_TIME_THRESHOLD
        && candidate.is_some_and(|id| session.timers().remaining(id) > remaining);

    match session.tasks().incomplete_in_zone(slot.zone()).next() {
        Some(task) if !running_out => {
            let to_task = task.pos - slot.pos;
            input.intent = to_task.normalize_or_zero();
            input.sprint = slot.sprint_energy > 0.0 && to_task.length() > SPRINT_MIN_DISTANCE;
        }
        _ => input.switch_to = candidate.map(CharacterId::get),
    }
    input
}

/// Other character with work left in its zone and the most time on its clock
fn best_switch_target(session: &GameSession, active: CharacterId) -> Option<CharacterId> {
    CharacterId::ALL
        .into_iter()
        .filter(|&id| id != active && !session.timers().is_expired(id))
        .filter(|&id| session.tasks().incomplete_in_zone(id.zone()).next().is_some())
        .max_by(|&a, &b| {
            session
                .timers()
                .remaining(a)
                .total_cmp(&session.timers().remaining(b))
        })
}
