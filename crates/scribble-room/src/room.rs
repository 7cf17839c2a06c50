//! The room aggregate: sessions, the current round and the rules that move
//! between them.
//!
//! `Room` is plain synchronous state. Every transition returns what should
//! be sent (an [`Outbox`]) and which timer, if any, should be started. The
//! async [`RoomHandle`](crate::RoomHandle) owns the lock, spawns timers and
//! delivers the outbox after releasing the lock.

use rand::SeedableRng;
use rand::rngs::StdRng;
use scribble_protocol::{ChatMessage, ServerMessage, SessionId};
use scribble_session::{SessionRegistry, SessionSender};
use scribble_tick::TimerHandle;
use tokio::time::Instant;

use crate::fanout::{Outbox, Recipient};
use crate::round::{Phase, Round, RoundEnd};
use crate::turn::TurnScheduler;
use crate::words::WordBank;
use crate::{RoomConfig, RoomError};

/// A background timer a transition wants started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    /// Refresh the countdown every tick until the round ends.
    RoundClock,
    /// Start the next round after the restart delay.
    Restart,
}

/// The result of a state change.
#[derive(Debug, Default)]
#[must_use = "a transition's outbox must be delivered"]
pub struct Transition {
    /// Messages to deliver once the lock is released.
    pub outbox: Outbox,
    /// Timer to start while the lock is still held.
    pub timer: Option<TimerRequest>,
}

impl Transition {
    fn new(outbox: Outbox) -> Self {
        Self {
            outbox,
            timer: None,
        }
    }

    /// Appends `next`'s messages after ours. Its timer request wins.
    fn then(mut self, next: Transition) -> Self {
        self.outbox.extend(next.outbox);
        self.timer = next.timer.or(self.timer);
        self
    }
}

/// What one tick of the round clock did.
#[derive(Debug)]
pub enum ClockTick {
    /// The round the clock belonged to is no longer drawing. Stop.
    Stale,
    /// Countdown refreshed.
    Running(Outbox),
    /// Time ran out and the round ended.
    Expired(Transition),
}

/// The single game room.
#[derive(Debug)]
pub struct Room {
    config: RoomConfig,
    words: WordBank,
    rng: StdRng,
    sessions: SessionRegistry,
    turns: TurnScheduler,
    round: Round,
    restart: Option<TimerHandle>,
}

impl Room {
    /// Creates an empty room with the built-in vocabulary.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_words(config, WordBank::default(), StdRng::from_os_rng())
    }

    /// Creates an empty room with a custom vocabulary and RNG.
    ///
    /// An empty vocabulary falls back to the built-in one, since a drawer
    /// offered no words could never start drawing.
    pub fn with_words(config: RoomConfig, words: WordBank, rng: StdRng) -> Self {
        let words = if words.is_empty() {
            tracing::warn!("empty word bank, using the built-in vocabulary");
            WordBank::default()
        } else {
            words
        };
        Self {
            turns: TurnScheduler::new(config.max_rounds),
            config,
            words,
            rng,
            sessions: SessionRegistry::new(),
            round: Round::idle(),
            restart: None,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Whether the next round is scheduled to start on its own.
    pub fn restart_pending(&self) -> bool {
        self.restart.as_ref().is_some_and(|r| !r.is_finished())
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Registers a new session.
    ///
    /// The newcomer gets `connected` and a `gameState` snapshot; everyone
    /// gets the updated `players` list.
    pub fn join(&mut self, name: &str, sender: SessionSender) -> (SessionId, Outbox) {
        let id = self.sessions.join(name, sender).id;
        let mut outbox = Outbox::new();

        if let Some(session) = self.sessions.get(&id) {
            outbox.push_to(session, ServerMessage::Connected(session.connected()));
        }
        outbox.players(&self.sessions, &self.round);
        if let Some(session) = self.sessions.get(&id) {
            outbox.game_state_to(session, &self.round);
        }

        (id, outbox)
    }

    /// Removes a session and deals with the consequences for the round.
    ///
    /// - Too few players left during a round: the room resets (round
    ///   zeroed, scores cleared).
    /// - The drawer left: the round ends.
    /// - Everyone left still guessing has already guessed: the round ends.
    pub fn leave(&mut self, id: SessionId) -> Transition {
        let Some(departure) = self.sessions.leave(id) else {
            return Transition::default();
        };
        let remaining = self.sessions.len();
        let mut outbox = Outbox::new();

        if remaining < self.config.min_players {
            self.cancel_restart();
            if self.round.is_active() {
                tracing::info!(remaining, "too few players, resetting room");
                self.reset();
            }
            outbox.players(&self.sessions, &self.round);
            outbox.game_state(&self.sessions, &self.round);
            return Transition::new(outbox);
        }

        outbox.players(&self.sessions, &self.round);
        let transition = Transition::new(outbox);

        if self.round.is_active() && self.round.is_drawer(id) {
            tracing::info!(
                session_id = %id,
                name = %departure.session.name,
                round = self.round.number(),
                "drawer left, ending round"
            );
            return transition.then(self.end_round(RoundEnd::DrawerLeft));
        }
        if self.round.phase() == Phase::Drawing && self.round.all_guessed(self.sessions.order()) {
            tracing::info!(round = self.round.number(), "remaining players have all guessed, ending round");
            return transition.then(self.end_round(RoundEnd::AllGuessed));
        }
        transition
    }

    // -----------------------------------------------------------------------
    // Player requests
    // -----------------------------------------------------------------------

    /// Starts the first round (or the next one, between rounds). Owner
    /// only, and not while a round is running.
    pub fn start_game(&mut self, id: SessionId) -> Result<Transition, RoomError> {
        let session = self.sessions.get(&id).ok_or(RoomError::UnknownSession(id))?;
        if !session.is_owner() {
            return Err(RoomError::NotOwner(id));
        }
        if self.round.is_active() {
            return Err(RoomError::RoundInProgress);
        }
        let have = self.sessions.len();
        let need = self.config.min_players;
        if have < need {
            return Err(RoomError::NotEnoughPlayers { have, need });
        }
        Ok(self.start_round())
    }

    /// The notice sent when the owner tries to start too early.
    pub fn not_enough_players_notice(&self) -> Outbox {
        let mut outbox = Outbox::new();
        outbox.notice(
            &self.sessions,
            format!(
                "Need at least {} players to start the game!",
                self.config.min_players
            ),
        );
        outbox
    }

    /// The drawer picks word `index` from the offered choices.
    pub fn choose_word(
        &mut self,
        id: SessionId,
        index: usize,
        now: Instant,
    ) -> Result<Transition, RoomError> {
        let phase = self.round.phase();
        if phase != Phase::Choosing {
            return Err(RoomError::WrongPhase(phase));
        }
        if !self.round.is_drawer(id) {
            return Err(RoomError::NotDrawer(id));
        }
        let available = self.round.choices().len();
        let word = self
            .round
            .choices()
            .get(index)
            .cloned()
            .ok_or(RoomError::InvalidChoice { index, available })?;

        self.round.begin_drawing(word, self.config.round_secs, now);
        tracing::info!(session_id = %id, round = self.round.number(), "word chosen, drawing started");

        let mut outbox = Outbox::new();
        outbox.game_state(&self.sessions, &self.round);
        outbox.notice(&self.sessions, format!("{} is now drawing!", self.name_of(id)));
        Ok(Transition {
            outbox,
            timer: Some(TimerRequest::RoundClock),
        })
    }

    /// A chat line. During drawing, a guesser typing the exact word scores
    /// instead of chatting.
    pub fn chat(&mut self, id: SessionId, text: &str) -> Result<Transition, RoomError> {
        let session = self.sessions.get(&id).ok_or(RoomError::UnknownSession(id))?;
        if text.is_empty() {
            return Err(RoomError::EmptyMessage);
        }
        let name = session.name.clone();

        let is_guess = self.round.phase() == Phase::Drawing
            && !self.round.is_drawer(id)
            && self.round.word() == Some(text);
        if !is_guess {
            let mut outbox = Outbox::new();
            outbox.chat(&self.sessions, ChatMessage::player(name, text));
            return Ok(Transition::new(outbox));
        }

        // Already credited this round.
        if !self.round.credit(id) {
            tracing::debug!(session_id = %id, "repeat of correct guess suppressed");
            return Ok(Transition::default());
        }
        let score = self.sessions.award(&id, self.config.guess_points);
        tracing::info!(session_id = %id, ?score, round = self.round.number(), "correct guess");

        let mut outbox = Outbox::new();
        outbox.notice(&self.sessions, format!("{name} guessed the word!"));
        outbox.players(&self.sessions, &self.round);
        let transition = Transition::new(outbox);

        if self.round.all_guessed(self.sessions.order()) {
            tracing::info!(round = self.round.number(), "all players guessed, ending round early");
            return Ok(transition.then(self.end_round(RoundEnd::AllGuessed)));
        }
        Ok(transition)
    }

    /// Relays a drawing action from the drawer to everyone else.
    pub fn draw(
        &mut self,
        id: SessionId,
        action: serde_json::Value,
    ) -> Result<Transition, RoomError> {
        if !self.round.is_active() {
            return Err(RoomError::WrongPhase(self.round.phase()));
        }
        if !self.round.is_drawer(id) {
            return Err(RoomError::NotDrawer(id));
        }
        let mut outbox = Outbox::new();
        outbox.push(&self.sessions, Recipient::AllExcept(id), ServerMessage::Draw(action));
        Ok(Transition::new(outbox))
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// One tick of the round clock.
    pub fn tick_clock(&mut self, now: Instant) -> ClockTick {
        if self.round.phase() != Phase::Drawing {
            return ClockTick::Stale;
        }
        let Some(remaining) = self.round.remaining_at(now, self.config.round_secs) else {
            return ClockTick::Stale;
        };
        self.round.set_time_remaining(remaining);

        if remaining == 0 {
            tracing::info!(round = self.round.number(), "time's up");
            let mut outbox = Outbox::new();
            outbox.notice(&self.sessions, "Time's up!");
            let transition = Transition::new(outbox).then(self.end_round(RoundEnd::TimeUp));
            return ClockTick::Expired(transition);
        }

        let mut outbox = Outbox::new();
        outbox.game_state(&self.sessions, &self.round);
        ClockTick::Running(outbox)
    }

    /// Fired by the restart timer. Starts the next round if the room still
    /// has enough players and nobody started one in the meantime.
    pub fn restart(&mut self) -> Option<Transition> {
        if let Some(restart) = self.restart.take() {
            restart.detach();
        }
        if self.round.is_active() {
            tracing::debug!("round already running, skipping restart");
            return None;
        }
        if self.sessions.len() < self.config.min_players {
            tracing::info!(players = self.sessions.len(), "not enough players for next round");
            return None;
        }
        Some(self.start_round())
    }

    /// Attaches the clock task for the current round.
    pub(crate) fn arm_clock(&mut self, clock: TimerHandle) {
        self.round.arm_clock(clock);
    }

    /// Attaches the restart task, replacing any pending one.
    pub(crate) fn arm_restart(&mut self, restart: TimerHandle) {
        if let Some(old) = self.restart.replace(restart) {
            old.cancel();
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn start_round(&mut self) -> Transition {
        self.cancel_restart();
        let Some(drawer) = self.turns.next_drawer(self.sessions.order()) else {
            return Transition::default();
        };
        let advance = self.turns.advance();
        let mut outbox = Outbox::new();

        if advance.cycle_completed {
            tracing::info!(rounds = self.config.max_rounds, "cycle complete, publishing results");
            outbox.notice(&self.sessions, "Final Results!");
            outbox.push(
                &self.sessions,
                Recipient::All,
                ServerMessage::Results(self.sessions.ranked()),
            );
            self.sessions.reset_scores();
        }

        let choices = self.words.pick(self.config.word_choices, &mut self.rng);
        self.round = Round::choosing(drawer, choices, advance.number, self.config.round_secs);
        tracing::info!(session_id = %drawer, round = advance.number, "round started");

        outbox.push(&self.sessions, Recipient::All, ServerMessage::clear_canvas());
        outbox.game_state(&self.sessions, &self.round);
        outbox.players(&self.sessions, &self.round);
        outbox.notice(
            &self.sessions,
            "New round started! Waiting for drawer to choose a word...",
        );
        Transition::new(outbox)
    }

    fn end_round(&mut self, reason: RoundEnd) -> Transition {
        let word = self.round.finish(reason);
        tracing::info!(round = self.round.number(), ?reason, "round ended");

        let mut outbox = Outbox::new();
        if let Some(word) = word {
            outbox.notice(&self.sessions, format!("The word was: {word}"));
        }
        outbox.game_state(&self.sessions, &self.round);
        outbox.players(&self.sessions, &self.round);
        Transition {
            outbox,
            timer: Some(TimerRequest::Restart),
        }
    }

    /// Back to a zeroed, inactive round with scores cleared. The drawer
    /// rotation position is kept.
    fn reset(&mut self) {
        self.round = Round::idle();
        self.turns.reset_cycle();
        self.cancel_restart();
        self.sessions.reset_scores();
    }

    fn cancel_restart(&mut self) {
        if let Some(restart) = self.restart.take() {
            restart.cancel();
        }
    }

    fn name_of(&self, id: SessionId) -> String {
        self.sessions
            .get(&id)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }
}
