//! Session types: the server's record of one connected participant.
//!
//! A session tracks:
//! - WHO the participant is (`SessionId`, display name)
//! - WHAT they may do (`Role`)
//! - HOW they are doing (cumulative score)
//! - WHERE to deliver messages (an outbound channel drained by the
//!   connection's writer task)

use scribble_protocol::{
    Connected, PlayerResult, PlayerView, Role, ServerMessage, SessionId,
};
use tokio::sync::mpsc;

/// Name used when a participant connects without supplying one.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Longest display name kept, in characters. Longer names are cut.
pub const MAX_NAME_CHARS: usize = 32;

/// Channel sender for delivering outbound messages to one session.
///
/// The receiving half belongs to the connection handler, which encodes
/// each message and writes it to the socket.
pub type SessionSender = mpsc::UnboundedSender<ServerMessage>;

/// Trims a requested display name, falling back to [`DEFAULT_NAME`] when
/// nothing is left and capping it at [`MAX_NAME_CHARS`].
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_CHARS).collect()
}

/// A cloneable delivery endpoint for one session.
///
/// Broadcasts are computed while the room is locked but delivered after
/// the lock is released, so they carry outlets rather than borrowing the
/// session.
#[derive(Debug, Clone)]
pub struct Outlet {
    id: SessionId,
    sender: SessionSender,
}

impl Outlet {
    /// The session this outlet delivers to.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queues a message for the session.
    ///
    /// Delivery is best-effort: if the connection's receiver is gone the
    /// failure is logged and `false` returned. The session itself is only
    /// removed when its receive loop notices the disconnect.
    pub fn send(&self, msg: ServerMessage) -> bool {
        let kind = msg.kind();
        match self.sender.send(msg) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    session_id = %self.id,
                    kind,
                    "delivery failed, receiver closed"
                );
                false
            }
        }
    }
}

/// A single connected participant.
#[derive(Debug)]
pub struct Session {
    /// Unique for the lifetime of the process.
    pub id: SessionId,
    /// Display name shown to everyone.
    pub name: String,
    /// Owner or plain player.
    pub role: Role,
    /// Points earned in the current round cycle.
    pub score: u32,
    outlet: Outlet,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        name: String,
        role: Role,
        sender: SessionSender,
    ) -> Self {
        Self {
            id,
            name,
            role,
            score: 0,
            outlet: Outlet { id, sender },
        }
    }

    /// Queues a message for this session. See [`Outlet::send`].
    pub fn send(&self, msg: ServerMessage) -> bool {
        self.outlet.send(msg)
    }

    /// A detached handle for delivering to this session later.
    pub fn outlet(&self) -> Outlet {
        self.outlet.clone()
    }

    /// Whether this session may start games.
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// The `connected` payload announcing this session to itself.
    pub fn connected(&self) -> Connected {
        Connected {
            id: self.id,
            username: self.name.clone(),
            role: self.role,
        }
    }

    /// Public projection for the `players` broadcast.
    pub fn view(&self, is_drawing: bool) -> PlayerView {
        PlayerView {
            id: self.id,
            username: self.name.clone(),
            role: self.role,
            score: self.score,
            is_drawing,
        }
    }

    /// Row for the final standings.
    pub fn result(&self) -> PlayerResult {
        PlayerResult {
            id: self.id,
            username: self.name.clone(),
            role: self.role,
            score: self.score,
        }
    }
}
