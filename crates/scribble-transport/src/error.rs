use std::io;

/// What can go wrong moving frames between the server and a player.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Accepting a TCP connection failed.
    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    /// The HTTP upgrade to WebSocket was refused or broken.
    #[error("websocket upgrade failed: {0}")]
    Upgrade(String),

    /// The connection is already closed.
    #[error("connection closed")]
    Closed,

    /// The socket failed mid-conversation.
    #[error("socket error: {0}")]
    Socket(String),

    /// A binary frame that is not valid UTF-8.
    #[error("frame is not valid UTF-8: {0}")]
    InvalidFrame(String),
}
