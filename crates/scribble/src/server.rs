//! `ScribbleServer` builder and accept loop.
//!
//! This is the entry point for running a Scribble server. It ties together
//! all the layers: transport → protocol → session → room.

use std::net::SocketAddr;

use scribble_protocol::JsonCodec;
use scribble_room::{RoomConfig, RoomHandle};
use scribble_transport::{Transport, WebSocketTransport};

use crate::ScribbleError;
use crate::config::{DEFAULT_BIND, ServerConfig};
use crate::handler::handle_connection;

/// Builder for configuring and starting a Scribble server.
///
/// # Example
///
/// ```rust,no_run
/// use scribble::prelude::*;
///
/// # async fn run() -> Result<(), ScribbleError> {
/// let server = ScribbleServer::builder()
///     .bind("127.0.0.1:42069")
///     .room_config(RoomConfig { round_secs: 60, ..RoomConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ScribbleServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl ScribbleServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room rules.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Applies a full [`ServerConfig`].
    pub fn config(self, config: ServerConfig) -> Self {
        self.bind(&config.bind).room_config(config.room)
    }

    /// Binds the listener and creates the room.
    pub async fn build(self) -> Result<ScribbleServer, ScribbleError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let room = RoomHandle::new(self.room_config);

        Ok(ScribbleServer {
            transport,
            room,
            codec: JsonCodec,
        })
    }
}

impl Default for ScribbleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Scribble server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScribbleServer {
    transport: WebSocketTransport,
    room: RoomHandle,
    codec: JsonCodec,
}

impl ScribbleServer {
    /// Creates a new builder.
    pub fn builder() -> ScribbleServerBuilder {
        ScribbleServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The room every connection joins.
    pub fn room(&self) -> &RoomHandle {
        &self.room
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated; a failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), ScribbleError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Scribble server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let room = self.room.clone();
                    let codec = self.codec;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, room, codec).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
