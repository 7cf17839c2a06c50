//! The state of the current round.

use std::collections::HashSet;
use std::fmt;

use scribble_protocol::{GameStateView, SessionId};
use scribble_tick::TimerHandle;
use tokio::time::Instant;

use crate::words;

/// Where a round is in its lifecycle.
///
/// ```text
/// Idle ──start──→ Choosing ──choose──→ Drawing ──time up / all guessed──→ RoundEnd
///   ↑                                                                       │
///   └──────────── fewer than 2 players ──────────── restart delay ─→ Choosing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round yet, or the room was reset.
    Idle,
    /// A drawer is assigned and picking from the offered words.
    Choosing,
    /// The word is chosen and the clock is running.
    Drawing,
    /// The round is over and the next one has not started.
    RoundEnd,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Choosing => write!(f, "choosing"),
            Self::Drawing => write!(f, "drawing"),
            Self::RoundEnd => write!(f, "round end"),
        }
    }
}

/// Why a round finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    /// The clock ran out.
    TimeUp,
    /// Every guesser found the word.
    AllGuessed,
    /// The drawer disconnected.
    DrawerLeft,
}

/// One round. Replaced wholesale at every round start and room reset,
/// which drops (and so cancels) the old round's clock.
#[derive(Debug)]
pub struct Round {
    active: bool,
    drawer: Option<SessionId>,
    word: Option<String>,
    hint: String,
    time_remaining: u32,
    number: u32,
    choices: Vec<String>,
    guessed: HashSet<SessionId>,
    drawing_started: Option<Instant>,
    clock: Option<TimerHandle>,
}

impl Default for Round {
    fn default() -> Self {
        Self::idle()
    }
}

impl Round {
    /// The zeroed, inactive round.
    pub fn idle() -> Self {
        Self {
            active: false,
            drawer: None,
            word: None,
            hint: String::new(),
            time_remaining: 0,
            number: 0,
            choices: Vec::new(),
            guessed: HashSet::new(),
            drawing_started: None,
            clock: None,
        }
    }

    /// A fresh round waiting for `drawer` to pick one of `choices`.
    pub(crate) fn choosing(
        drawer: SessionId,
        choices: Vec<String>,
        number: u32,
        round_secs: u32,
    ) -> Self {
        Self {
            active: true,
            drawer: Some(drawer),
            time_remaining: round_secs,
            number,
            choices,
            ..Self::idle()
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.active, &self.word, self.drawer) {
            (true, None, _) => Phase::Choosing,
            (true, Some(_), _) => Phase::Drawing,
            (false, _, Some(_)) => Phase::RoundEnd,
            (false, _, None) => Phase::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn drawer(&self) -> Option<SessionId> {
        self.drawer
    }

    pub fn is_drawer(&self, id: SessionId) -> bool {
        self.drawer == Some(id)
    }

    /// The secret word, once chosen and while the round runs.
    pub fn word(&self) -> Option<&str> {
        self.word.as_deref()
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn has_guessed(&self, id: SessionId) -> bool {
        self.guessed.contains(&id)
    }

    /// Whether a clock task is attached to this round.
    pub fn has_clock(&self) -> bool {
        self.clock.as_ref().is_some_and(|c| !c.is_finished())
    }

    /// Locks in the drawer's choice and starts the countdown.
    pub(crate) fn begin_drawing(&mut self, word: String, round_secs: u32, now: Instant) {
        self.hint = words::hint(&word);
        self.word = Some(word);
        self.choices.clear();
        self.time_remaining = round_secs;
        self.drawing_started = Some(now);
    }

    /// Whole seconds left at `now`, or `None` if the clock isn't running.
    pub(crate) fn remaining_at(&self, now: Instant, round_secs: u32) -> Option<u32> {
        let started = self.drawing_started?;
        let elapsed = now.saturating_duration_since(started).as_secs();
        Some(u64::from(round_secs).saturating_sub(elapsed) as u32)
    }

    pub(crate) fn set_time_remaining(&mut self, secs: u32) {
        self.time_remaining = secs;
    }

    /// Credits `id` with a correct guess. Returns `false` if already
    /// credited this round.
    pub(crate) fn credit(&mut self, id: SessionId) -> bool {
        self.guessed.insert(id)
    }

    /// Whether everyone in `order` other than the drawer has guessed.
    pub(crate) fn all_guessed(&self, order: &[SessionId]) -> bool {
        order
            .iter()
            .filter(|id| !self.is_drawer(**id))
            .all(|id| self.guessed.contains(id))
    }

    pub(crate) fn arm_clock(&mut self, clock: TimerHandle) {
        if let Some(old) = self.clock.replace(clock) {
            old.cancel();
        }
    }

    /// Deactivates the round and hands back the secret word. The masked
    /// hint stays as it was; the word only goes out as a chat notice.
    ///
    /// A clock ending its own round is released rather than aborted; on
    /// any other path the clock is cancelled.
    pub(crate) fn finish(&mut self, reason: RoundEnd) -> Option<String> {
        if let Some(clock) = self.clock.take() {
            match reason {
                RoundEnd::TimeUp => clock.detach(),
                RoundEnd::AllGuessed | RoundEnd::DrawerLeft => clock.cancel(),
            }
        }
        self.active = false;
        self.choices.clear();
        self.drawing_started = None;
        self.word.take()
    }

    /// The `gameState` payload as `recipient` should see it.
    ///
    /// The drawer gets the unmasked word and the word choices; everyone
    /// else gets the hint and no choices.
    pub fn view_for(&self, recipient: SessionId) -> GameStateView {
        let is_drawer = self.is_drawer(recipient);
        let word_hint = match (&self.word, is_drawer) {
            (Some(word), true) => word.clone(),
            _ => self.hint.clone(),
        };
        GameStateView {
            is_active: self.active,
            word_hint,
            current_drawer: self.drawer,
            time_remaining: self.time_remaining,
            round_number: self.number,
            word_choices: if is_drawer {
                self.choices.clone()
            } else {
                Vec::new()
            },
        }
    }
}
