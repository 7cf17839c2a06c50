//! WebSocket transport over `tokio-tungstenite`.
//!
//! Players send their display name in the upgrade URL
//! (`ws://host/?username=alice`), so the query string is captured during
//! the handshake and kept on the connection.

use std::io;
use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::{Connection, ConnectionId, Transport, TransportError};

type Socket = WebSocketStream<TcpStream>;

/// Listens for WebSocket upgrades on a TCP port.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Binds the listener. Use port 0 to let the OS pick one.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!(addr = ?listener.local_addr().ok(), "listening for WebSocket upgrades");
        Ok(Self { listener })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<WebSocketConnection, TransportError> {
        let (tcp, peer) = self.listener.accept().await.map_err(TransportError::Accept)?;

        let mut query = None;
        let socket = tokio_tungstenite::accept_hdr_async(
            tcp,
            |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                query = req.uri().query().map(str::to_owned);
                Ok(resp)
            },
        )
        .await
        .map_err(|e| TransportError::Upgrade(e.to_string()))?;

        let conn = WebSocketConnection::new(ConnectionId::next(), peer, query, socket);
        tracing::debug!(id = %conn.id, %peer, "WebSocket upgrade complete");
        Ok(conn)
    }
}

/// An upgraded player connection.
///
/// Split into halves with separate locks, so sending never waits on a
/// pending [`recv`](Connection::recv).
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    query: Option<String>,
    outgoing: Mutex<SplitSink<Socket, Message>>,
    incoming: Mutex<SplitStream<Socket>>,
}

impl WebSocketConnection {
    fn new(id: ConnectionId, peer: SocketAddr, query: Option<String>, socket: Socket) -> Self {
        let (outgoing, incoming) = socket.split();
        Self {
            id,
            peer,
            query,
            outgoing: Mutex::new(outgoing),
            incoming: Mutex::new(incoming),
        }
    }
}

fn socket_error(e: WsError) -> TransportError {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
        other => TransportError::Socket(other.to_string()),
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, frame: &str) -> Result<(), TransportError> {
        self.outgoing
            .lock()
            .await
            .send(Message::Text(frame.to_owned().into()))
            .await
            .map_err(socket_error)
    }

    async fn recv(&self) -> Result<Option<String>, TransportError> {
        let mut incoming = self.incoming.lock().await;
        while let Some(msg) = incoming.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => return Ok(None),
                Err(e) => return Err(socket_error(e)),
            };
            match msg {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                // Some clients send JSON as binary frames.
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes.to_vec())
                        .map(Some)
                        .map_err(|e| TransportError::InvalidFrame(e.to_string()));
                }
                Message::Close(frame) => {
                    tracing::trace!(id = %self.id, ?frame, "peer sent close");
                    return Ok(None);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.outgoing.lock().await.close().await.map_err(socket_error)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}
