//! Drawer rotation and the round counter.

use scribble_protocol::SessionId;

/// Where a newly started round sits in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundAdvance {
    /// 1-based number of the round being started.
    pub number: u32,
    /// The previous round was the last of a cycle. Results are due.
    pub cycle_completed: bool,
}

/// Picks drawers round-robin over join order and counts rounds.
///
/// The last drawer survives a room reset, so rotation picks up where it
/// left off. The round counter does not.
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    drawer: Option<SessionId>,
    round: u32,
    max_rounds: u32,
}

impl TurnScheduler {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            drawer: None,
            round: 0,
            max_rounds: max_rounds.max(1),
        }
    }

    /// The most recently chosen drawer.
    pub fn drawer(&self) -> Option<SessionId> {
        self.drawer
    }

    /// Rounds started in the current cycle.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Chooses the next drawer from `order` (join order).
    ///
    /// The session after the previous drawer goes next, wrapping at the
    /// end. If the previous drawer has left, rotation restarts at the
    /// earliest joiner.
    pub fn next_drawer(&mut self, order: &[SessionId]) -> Option<SessionId> {
        let next = next_drawer(order, self.drawer)?;
        self.drawer = Some(next);
        Some(next)
    }

    /// Moves the counter to the next round, wrapping after `max_rounds`.
    pub fn advance(&mut self) -> RoundAdvance {
        let cycle_completed = self.round >= self.max_rounds;
        if cycle_completed {
            self.round = 0;
        }
        self.round += 1;
        RoundAdvance {
            number: self.round,
            cycle_completed,
        }
    }

    /// Starts a fresh cycle. The drawer position is kept.
    pub fn reset_cycle(&mut self) {
        self.round = 0;
    }
}

/// The drawer following `current` in `order`.
pub fn next_drawer(order: &[SessionId], current: Option<SessionId>) -> Option<SessionId> {
    if order.is_empty() {
        return None;
    }
    let next = current
        .and_then(|current| order.iter().position(|id| *id == current))
        .map_or(0, |i| (i + 1) % order.len());
    Some(order[next])
}
