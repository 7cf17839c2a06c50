//! Core protocol types for Scribble's wire format.
//!
//! Every frame on the wire is a JSON object `{"type": <tag>, "data": <payload>}`.
//! Both directions are modelled as closed enums: a frame whose tag is not
//! one of the listed variants, or whose payload has the wrong shape, fails
//! to decode instead of reaching the game core.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name used for notices the server itself posts in chat.
pub const SYSTEM_USERNAME: &str = "System";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected session.
///
/// A random v4 UUID, serialized as its hyphenated string so browser clients
/// can use it directly as a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a session is allowed to do in the room.
///
/// Exactly one session is the `Owner` while the room is non-empty; only the
/// owner may start a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Player,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Player => write!(f, "player"),
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Sent once to a new session right after it is registered.
///
/// Wire keys are `clientId`, `username` and `type`, which browser clients
/// read to learn their own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connected {
    #[serde(rename = "clientId")]
    pub id: SessionId,
    pub username: String,
    #[serde(rename = "type")]
    pub role: Role,
}

/// One row of the `players` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: SessionId,
    pub username: String,
    pub role: Role,
    pub score: u32,
    pub is_drawing: bool,
}

/// One row of the final standings sent at the end of a round cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub id: SessionId,
    pub username: String,
    pub role: Role,
    pub score: u32,
}

/// A chat line, either typed by a player or posted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub username: String,
    pub message: String,
    pub is_system: bool,
}

impl ChatMessage {
    /// A notice posted by the server.
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            username: SYSTEM_USERNAME.to_string(),
            message: message.into(),
            is_system: true,
        }
    }

    /// A line typed by a player.
    pub fn player(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            message: message.into(),
            is_system: false,
        }
    }
}

/// The round as one recipient is allowed to see it.
///
/// `word_hint` carries the masked hint for guessers and the real word for
/// the drawer. `word_choices` is only populated for the drawer while a word
/// is being picked, and is left out of the JSON when empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub is_active: bool,
    pub word_hint: String,
    pub current_drawer: Option<SessionId>,
    pub time_remaining: u32,
    pub round_number: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub word_choices: Vec<String>,
}

/// Payload of a client `chat` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Payload of a client `chooseWord` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChooseWord {
    pub word_index: usize,
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// Everything a client may send.
///
/// `#[serde(tag = "type", content = "data")]` gives the adjacently tagged
/// shape the browser client speaks:
///   `{ "type": "chooseWord", "data": { "wordIndex": 0 } }`
/// `startGame` carries no payload; `data` may be omitted or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Opaque drawing payload from the drawer, relayed verbatim.
    Draw(serde_json::Value),
    Chat(ChatRequest),
    StartGame,
    ChooseWord(ChooseWord),
}

/// Everything the server may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    Connected(Connected),
    Players(Vec<PlayerView>),
    GameState(GameStateView),
    Chat(ChatMessage),
    /// A relayed drawing payload, or `{"type":"clear"}` at round start.
    Draw(serde_json::Value),
    Results(Vec<PlayerResult>),
}

impl ServerMessage {
    /// The canvas reset sent to everyone when a round begins.
    pub fn clear_canvas() -> Self {
        Self::Draw(serde_json::json!({ "type": "clear" }))
    }

    /// Wire tag of this frame, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::Players(_) => "players",
            Self::GameState(_) => "gameState",
            Self::Chat(_) => "chat",
            Self::Draw(_) => "draw",
            Self::Results(_) => "results",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
