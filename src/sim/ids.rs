//! Identifiers for characters and tasks

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::CHARACTER_COUNT;

/// One of the three trapped characters (1, 2 or 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CharacterId(u8);

impl CharacterId {
    pub const FIRST: CharacterId = CharacterId(1);

    /// All characters in id order
    pub const ALL: [CharacterId; CHARACTER_COUNT] = [CharacterId(1), CharacterId(2), CharacterId(3)];

    /// Validate a raw id; anything outside 1..=3 is rejected
    pub fn new(raw: u8) -> Option<Self> {
        if (1..=CHARACTER_COUNT as u8).contains(&raw) {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based slot index
    #[inline]
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Zone this character is trapped in
    #[inline]
    pub fn zone(self) -> u8 {
        self.0 - 1
    }

    /// Next character in cyclic order (3 wraps to 1)
    pub fn next(self) -> Self {
        Self(self.0 % CHARACTER_COUNT as u8 + 1)
    }
}

impl TryFrom<u8> for CharacterId {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("character id out of range: {raw}"))
    }
}

impl From<CharacterId> for u8 {
    fn from(id: CharacterId) -> u8 {
        id.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registration-order task id, starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {}", self.0)
    }
}
