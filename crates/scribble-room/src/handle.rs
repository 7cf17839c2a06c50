//! Shared, lock-guarded access to the room.
//!
//! Every operation follows the same discipline:
//!
//! 1. take the write lock
//! 2. apply the transition and start any timer it asks for
//! 3. release the lock
//! 4. deliver the outbox
//!
//! Timers get a `Weak` reference, so a pending timer never keeps a dropped
//! room alive.

use std::sync::{Arc, Weak};
use std::time::Duration;

use scribble_protocol::{ClientMessage, SessionId};
use scribble_session::SessionSender;
use scribble_tick::{TickScheduler, TimerHandle};
use tokio::sync::{RwLock, RwLockReadGuard};
use tokio::time::Instant;

use crate::fanout::Outbox;
use crate::room::{ClockTick, Room, TimerRequest, Transition};
use crate::{Phase, RoomConfig, RoomError};

/// Handle to the room. Cheap to clone; every connection holds one.
#[derive(Clone)]
pub struct RoomHandle {
    inner: Arc<RwLock<Room>>,
}

impl RoomHandle {
    /// Creates a room with the built-in vocabulary.
    pub fn new(config: RoomConfig) -> Self {
        Self::from_room(Room::new(config))
    }

    /// Wraps an already constructed room.
    pub fn from_room(room: Room) -> Self {
        Self {
            inner: Arc::new(RwLock::new(room)),
        }
    }

    /// Read access for inspection. Hold it briefly: it blocks every writer.
    pub async fn read(&self) -> RwLockReadGuard<'_, Room> {
        self.inner.read().await
    }

    /// The current round phase.
    pub async fn phase(&self) -> Phase {
        self.inner.read().await.phase()
    }

    /// Registers a session and announces it. Returns the new id.
    pub async fn join(&self, name: &str, sender: SessionSender) -> SessionId {
        let (id, outbox) = self.inner.write().await.join(name, sender);
        outbox.deliver();
        id
    }

    /// Removes a session. Unknown ids are ignored.
    pub async fn leave(&self, id: SessionId) {
        let mut room = self.inner.write().await;
        let transition = room.leave(id);
        let outbox = commit(&self.inner, &mut room, transition);
        drop(room);
        outbox.deliver();
    }

    /// Applies one client request.
    ///
    /// Rejected requests change nothing and send nothing, except a start
    /// attempt with too few players, which gets a notice in chat. The
    /// rejection is logged at `debug` and returned.
    pub async fn dispatch(&self, id: SessionId, msg: ClientMessage) -> Result<(), RoomError> {
        let mut room = self.inner.write().await;
        let result = match msg {
            ClientMessage::Draw(action) => room.draw(id, action),
            ClientMessage::Chat(req) => room.chat(id, &req.message),
            ClientMessage::StartGame => room.start_game(id),
            ClientMessage::ChooseWord(choice) => {
                room.choose_word(id, choice.word_index, Instant::now())
            }
        };

        let (outbox, result) = match result {
            Ok(transition) => (commit(&self.inner, &mut room, transition), Ok(())),
            Err(e) => {
                tracing::debug!(session_id = %id, error = %e, "request rejected");
                let outbox = match e {
                    RoomError::NotEnoughPlayers { .. } => room.not_enough_players_notice(),
                    _ => Outbox::new(),
                };
                (outbox, Err(e))
            }
        };
        drop(room);
        outbox.deliver();
        result
    }
}

/// Starts the timer a transition asked for and hands back its outbox.
/// Runs with the write lock held, so the room's timer bookkeeping never
/// races the timers themselves.
fn commit(inner: &Arc<RwLock<Room>>, room: &mut Room, transition: Transition) -> Outbox {
    match transition.timer {
        Some(TimerRequest::RoundClock) => {
            let interval = room.config().tick_interval;
            let clock = TimerHandle::spawn(run_clock(Arc::downgrade(inner), interval));
            room.arm_clock(clock);
        }
        Some(TimerRequest::Restart) => {
            let delay = room.config().restart_delay;
            let restart = TimerHandle::after(delay, run_restart(Arc::downgrade(inner)));
            room.arm_restart(restart);
        }
        None => {}
    }
    transition.outbox
}

/// Refreshes the countdown once per tick until the round stops drawing.
async fn run_clock(room: Weak<RwLock<Room>>, interval: Duration) {
    let mut scheduler = TickScheduler::with_interval(interval);
    loop {
        let tick = scheduler.wait_for_tick().await;
        let Some(inner) = room.upgrade() else {
            return;
        };
        if tick.overrun {
            tracing::debug!(
                tick = tick.tick,
                skipped = tick.ticks_skipped,
                "countdown refresh late, remaining time taken from the clock"
            );
        }
        let mut guard = inner.write().await;
        let outbox = match guard.tick_clock(Instant::now()) {
            ClockTick::Stale => {
                tracing::debug!(tick = tick.tick, "round no longer drawing, clock stopped");
                return;
            }
            ClockTick::Running(outbox) => outbox,
            ClockTick::Expired(transition) => {
                let outbox = commit(&inner, &mut guard, transition);
                drop(guard);
                outbox.deliver();
                return;
            }
        };
        drop(guard);
        outbox.deliver();
    }
}

/// Starts the next round once the restart delay has passed.
async fn run_restart(room: Weak<RwLock<Room>>) {
    let Some(inner) = room.upgrade() else {
        return;
    };
    let mut guard = inner.write().await;
    let Some(transition) = guard.restart() else {
        return;
    };
    let outbox = commit(&inner, &mut guard, transition);
    drop(guard);
    outbox.deliver();
}
