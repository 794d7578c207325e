//! Deterministic session core
//!
//! All gameplay rules live here. This module must stay pure and deterministic:
//! - Time only enters through `tick`'s delta
//! - Seeded RNG only (level population)
//! - Stable iteration order (by character and task ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod character;
pub mod events;
pub mod ids;
pub mod layout;
pub mod session;
pub mod state;
pub mod task;
pub mod tick;
pub mod timer;

pub use character::CharacterSlot;
pub use events::{EventBus, GameOverReason, SessionEvent, SessionObserver};
pub use ids::{CharacterId, TaskId};
pub use layout::Layout;
pub use session::GameSession;
pub use state::{SessionConfig, SessionError, SessionPhase, SessionState};
pub use task::{ProximityPolicy, Task, TaskKind, TaskSystem};
pub use tick::TickInput;
pub use timer::{TimerEvent, TimerMode, TimerReading, TimerSnapshot, TimerSystem};
