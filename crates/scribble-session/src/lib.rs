//! Session registry for Scribble.
//!
//! This crate tracks who is connected to the room:
//!
//! 1. **Registration:** each connection becomes a [`Session`] with a fresh id
//! 2. **Ownership:** exactly one session is the owner while anyone is
//!    connected; the role passes on in join order when the owner leaves
//! 3. **Projection:** [`PlayerView`](scribble_protocol::PlayerView) rows and
//!    ranked standings for broadcasts
//!
//! ```text
//! Room (above)  ← owns the registry, decides rounds and scoring
//!     ↕
//! Session registry (this crate)  ← identity, role, score, outbound channel
//!     ↕
//! Protocol (below)  ← SessionId, Role, ServerMessage
//! ```

mod registry;
mod session;

pub use registry::{Departure, SessionRegistry};
pub use session::{
    DEFAULT_NAME, MAX_NAME_CHARS, Outlet, Session, SessionSender, normalize_name,
};
