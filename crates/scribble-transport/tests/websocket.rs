#![cfg(feature = "websocket")]

use futures_util::{SinkExt, StreamExt};
use scribble_transport::{Connection, Transport, TransportError, WebSocketConnection, WebSocketTransport};
use tokio_tungstenite::tungstenite::Message;

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Opens a listener, connects one client to `path`, and returns both ends.
async fn pair(path: &str) -> (WebSocketConnection, Client) {
    let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();
    let accepted = tokio::spawn(async move { transport.accept().await });

    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
        .await
        .unwrap();
    let conn = accepted.await.unwrap().unwrap();
    (conn, client)
}

#[tokio::test]
async fn test_text_frames_flow_both_ways() {
    let (conn, mut client) = pair("/").await;

    conn.send(r#"{"type":"players","data":[]}"#).await.unwrap();
    let frame = client.next().await.unwrap().unwrap();
    assert_eq!(frame, Message::Text(r#"{"type":"players","data":[]}"#.into()));

    client
        .send(Message::Text(r#"{"type":"startGame"}"#.into()))
        .await
        .unwrap();
    assert_eq!(
        conn.recv().await.unwrap().as_deref(),
        Some(r#"{"type":"startGame"}"#)
    );
}

#[tokio::test]
async fn test_username_query_is_captured() {
    let (with_name, _c1) = pair("/?username=alice").await;
    assert_eq!(with_name.query(), Some("username=alice"));

    let (without, _c2) = pair("/").await;
    assert_eq!(without.query(), None);
}

#[tokio::test]
async fn test_peer_addr_is_loopback() {
    let (conn, _client) = pair("/").await;
    assert!(conn.peer_addr().ip().is_loopback());
    assert!(conn.id().to_string().starts_with("conn-"));
}

#[tokio::test]
async fn test_binary_frames_decode_as_utf8() {
    let (conn, mut client) = pair("/").await;

    client
        .send(Message::Binary(b"{\"type\":\"chat\"}".to_vec().into()))
        .await
        .unwrap();
    assert_eq!(conn.recv().await.unwrap().as_deref(), Some("{\"type\":\"chat\"}"));

    client
        .send(Message::Binary(vec![0xff, 0xfe, 0x00].into()))
        .await
        .unwrap();
    assert!(matches!(conn.recv().await, Err(TransportError::InvalidFrame(_))));
}

#[tokio::test]
async fn test_client_close_ends_stream() {
    let (conn, mut client) = pair("/").await;

    client.close(None).await.unwrap();
    assert_eq!(conn.recv().await.unwrap(), None);
}

#[tokio::test]
async fn test_send_does_not_wait_for_pending_recv() {
    let (conn, mut client) = pair("/").await;
    let conn = std::sync::Arc::new(conn);

    let reader = {
        let conn = conn.clone();
        tokio::spawn(async move { conn.recv().await })
    };
    tokio::task::yield_now().await;

    tokio::time::timeout(std::time::Duration::from_secs(1), conn.send("ping"))
        .await
        .expect("send blocked behind recv")
        .unwrap();
    assert_eq!(client.next().await.unwrap().unwrap(), Message::Text("ping".into()));

    client.send(Message::Text("pong".into())).await.unwrap();
    assert_eq!(reader.await.unwrap().unwrap().as_deref(), Some("pong"));
}

#[tokio::test]
async fn test_bind_rejects_bad_address() {
    let err = WebSocketTransport::bind("definitely not an address")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, TransportError::Bind { .. }));
}
