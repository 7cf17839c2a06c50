//! Transport layer for Scribble.
//!
//! The server accepts players through a [`Transport`] and talks to each one
//! through a [`Connection`] that moves whole text frames. Nothing above this
//! crate touches sockets.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] over `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique label for an accepted connection, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next id. Ids start at 1 and never repeat.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Source of new player connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next player and completes their handshake.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// One player's connection.
///
/// Methods take `&self` so a writer task and the receive loop can share
/// the connection behind an `Arc`.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes one text frame.
    async fn send(&self, frame: &str) -> Result<(), Self::Error>;

    /// Reads the next text frame. `Ok(None)` means the player hung up.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Starts a clean shutdown of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    /// Remote address of the player.
    fn peer_addr(&self) -> SocketAddr;

    /// Query string of the connect URL (without the `?`), if there was one.
    fn query(&self) -> Option<&str>;
}
