//! Per-connection handler: registration and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read `username` from the connect query string
//!   2. Join the room (sends `connected`, `players`, `gameState`)
//!   3. Spawn a writer task draining the session channel into the socket
//!   4. Loop: receive frames → decode → dispatch to the room
//!   5. On exit, the session guard removes the session from the room

use std::sync::Arc;

use scribble_protocol::{ClientMessage, Codec, SessionId};
use scribble_room::RoomHandle;
use scribble_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ScribbleError;

/// Query parameter carrying the display name.
const USERNAME_PARAM: &str = "username";

/// Drop guard that removes a session from the room when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the async leave runs in its own task.
struct SessionGuard {
    session_id: SessionId,
    room: RoomHandle,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let session_id = self.session_id;
        let room = self.room.clone();
        tokio::spawn(async move {
            room.leave(session_id).await;
        });
    }
}

/// Extracts the requested display name from a raw query string.
///
/// Missing or blank names come back empty; the session registry swaps in
/// the default.
pub(crate) fn username_from_query(query: Option<&str>) -> String {
    query
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == USERNAME_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    room: RoomHandle,
    codec: C,
) -> Result<(), ScribbleError>
where
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let name = username_from_query(conn.query());
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), requested_name = %name, "handling new connection");

    // Messages queue in the channel until the writer starts, so joining
    // first loses nothing.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session_id = room.join(&name, tx).await;
    let _guard = SessionGuard {
        session_id,
        room: room.clone(),
    };
    tracing::info!(%conn_id, %session_id, "session connected");

    let writer = {
        let conn = Arc::clone(&conn);
        let codec = codec.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let frame = match codec.encode(&msg) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!(
                            %session_id,
                            kind = msg.kind(),
                            error = %e,
                            "failed to encode outbound message"
                        );
                        continue;
                    }
                };
                if let Err(e) = conn.send(&frame).await {
                    tracing::debug!(%session_id, error = %e, "send failed, stopping writer");
                    break;
                }
            }
        })
    };

    let result = receive_loop(&conn, &room, &codec, session_id).await;

    writer.abort();
    if let Err(e) = conn.close().await {
        tracing::trace!(%session_id, error = %e, "close after disconnect");
    }

    // _guard drops here → session leaves the room.
    result
}

/// Reads frames until the peer goes away.
async fn receive_loop<C: Codec>(
    conn: &WebSocketConnection,
    room: &RoomHandle,
    codec: &C,
    session_id: SessionId,
) -> Result<(), ScribbleError> {
    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::info!(%session_id, "connection closed cleanly");
                return Ok(());
            }
            Err(TransportError::InvalidFrame(reason)) => {
                tracing::debug!(%session_id, %reason, "dropping non-UTF-8 frame");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let msg: ClientMessage = match codec.decode(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%session_id, error = %e, "failed to decode frame");
                continue;
            }
        };

        // Rejections are logged by the room and never answered.
        let _ = room.dispatch(session_id, msg).await;
    }
}
