//! Wire protocol for Scribble.
//!
//! [`ClientMessage`] and [`ServerMessage`] are the frames the browser client
//! and the server exchange. A [`Codec`] turns them into text and back;
//! [`JsonCodec`] is the one in use.
//!
//! ```text
//! Transport (text frames) → Protocol (typed messages) → Room (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ChatMessage, ChatRequest, ChooseWord, ClientMessage, Connected,
    GameStateView, PlayerResult, PlayerView, Role, SYSTEM_USERNAME,
    ServerMessage, SessionId,
};
