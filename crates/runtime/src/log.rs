//! Combat log: the player-facing record of what happened.

use std::collections::VecDeque;
use std::fmt;

use combat_core::CombatPhase;

/// One line of the combat log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub turn: u32,
    pub phase: CombatPhase,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[turn {} | {}] {}", self.turn, self.phase, self.message)
    }
}

/// Bounded log; the oldest entries fall off once `capacity` is reached.
#[derive(Clone, Debug)]
pub struct CombatLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl CombatLog {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, turn: u32, phase: CombatPhase, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let entry = LogEntry {
            turn,
            phase,
            message: message.into(),
        };
        tracing::debug!(%entry, "combat log");
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Whether any entry's message equals `message`.
    pub fn contains(&self, message: &str) -> bool {
        self.entries.iter().any(|entry| entry.message == message)
    }
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::new()
    }
}
