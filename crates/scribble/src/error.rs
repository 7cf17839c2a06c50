//! Unified error type for the Scribble server.

use scribble_protocol::ProtocolError;
use scribble_room::RoomError;
use scribble_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ScribbleError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rejected room request.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Bad configuration from the environment.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Socket-level I/O outside the transport (e.g. reading the bound
    /// address).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
