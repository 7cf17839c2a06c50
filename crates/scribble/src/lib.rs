//! # Scribble
//!
//! A real-time multiplayer drawing and guessing game server.
//!
//! Players connect over WebSocket with `?username=<name>`. One of them draws
//! a secret word while the others race to type it in chat. Drawers rotate
//! round-robin, correct guesses score points, and after ten rounds the
//! final standings are published and scores reset.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn run() -> Result<(), ScribbleError> {
//! let server = ScribbleServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod logging;
mod server;

pub use config::{
    ConfigError, DEFAULT_BIND, ENV_BIND, ENV_MAX_ROUNDS, ENV_ROUND_SECS, ServerConfig,
};
pub use error::ScribbleError;
pub use server::{ScribbleServer, ScribbleServerBuilder};

/// Everything needed to embed or run a server.
pub mod prelude {
    pub use crate::{ConfigError, ScribbleError, ScribbleServer, ScribbleServerBuilder, ServerConfig};
    pub use scribble_protocol::{
        ChatMessage, ClientMessage, GameStateView, PlayerView, Role, ServerMessage, SessionId,
    };
    pub use scribble_room::{Phase, RoomConfig, RoomError, RoomHandle};
}
