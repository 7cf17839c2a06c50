//! The Scribble game room.
//!
//! One room holds every connected session and runs rounds of the drawing
//! game: a drawer picks a word, draws it, and everyone else races to type
//! it in chat before the clock runs out.
//!
//! # Key types
//!
//! - [`Room`]: synchronous state and rules; each transition returns an
//!   [`Outbox`] and an optional [`TimerRequest`]
//! - [`RoomHandle`]: shared async access; owns the lock, the round clock
//!   and the restart timer
//! - [`Round`] / [`Phase`]: the current round and where it is
//! - [`TurnScheduler`]: round-robin drawer rotation and round counting
//! - [`WordBank`]: vocabulary and hint masking
//! - [`RoomConfig`]: round length, cycle length, scoring

mod config;
mod error;
mod fanout;
mod handle;
mod room;
mod round;
mod turn;
mod words;

pub use config::RoomConfig;
pub use error::RoomError;
pub use fanout::{Outbox, Recipient};
pub use handle::RoomHandle;
pub use room::{ClockTick, Room, TimerRequest, Transition};
pub use round::{Phase, Round, RoundEnd};
pub use turn::{RoundAdvance, TurnScheduler, next_drawer};
pub use words::{WordBank, hint};
