//! Error types for the room layer.

use scribble_protocol::SessionId;

/// Why a player request was rejected.
///
/// None of these reach the client. The room logs them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The session is not (or no longer) in the room.
    #[error("session {0} is not in the room")]
    UnknownSession(SessionId),

    /// Only the owner may start the game.
    #[error("session {0} is not the room owner")]
    NotOwner(SessionId),

    /// Too few players to start a round.
    #[error("need at least {need} players, have {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    /// A round is already running.
    #[error("a round is already in progress")]
    RoundInProgress,

    /// Only the current drawer may pick the word or draw.
    #[error("session {0} is not the drawer")]
    NotDrawer(SessionId),

    /// The request does not fit the current phase of the round.
    #[error("not allowed while {0}")]
    WrongPhase(crate::Phase),

    /// The chosen index is outside the offered choices.
    #[error("word choice {index} out of range (have {available})")]
    InvalidChoice { index: usize, available: usize },

    /// Blank chat messages are ignored.
    #[error("empty chat message")]
    EmptyMessage,
}
