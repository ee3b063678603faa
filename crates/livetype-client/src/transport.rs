//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which speaks Engine.IO v4 / Socket.IO v4 over
//! a WebSocket. This is a thin layer that only moves messages: protocol logic
//! remains in the Sans-IO [`Client`](crate::Client).
//!
//! The connection task answers server pings, watches for silence, and
//! reconnects with backoff after an established connection drops. Every
//! (re)connect is reported as [`TransportEvent::Connected`] so the client
//! signs in again. Messages queued while the link was down are discarded:
//! they were computed against state the server no longer has.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use livetype_proto::{ClientMessage, Handshake, Packet, ProtocolError, ServerMessage};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::mpsc::{self, error::TryRecvError},
    time::Instant,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};
use url::Url;

use crate::event::TransportEvent;

/// Query selecting Engine.IO v4 over a raw WebSocket (no polling upgrade).
const ENGINE_IO_QUERY: &str = "EIO=4&transport=websocket";

/// Default Socket.IO mount point.
const SOCKET_IO_PATH: &str = "/socket.io/";

/// Limit for the WebSocket upgrade plus namespace connect.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// First reconnect delay; doubles up to [`RECONNECT_DELAY_MAX`].
const RECONNECT_DELAY_MIN: Duration = Duration::from_secs(1);

/// Longest wait between reconnect attempts.
const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(30);

/// Capacity of the channels between the runtime and the connection task.
const CHANNEL_CAPACITY: usize = 256;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server URL cannot be used.
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Engine.IO or Socket.IO handshake failed.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Server went quiet for longer than its own ping deadline.
    #[error("no traffic from server for {0:?}")]
    Timeout(Duration),

    /// Connection closed.
    #[error("connection closed: {0}")]
    Closed(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Handle to a connected client with WebSocket transport.
///
/// Provides channels for message transport. Messages are sent/received via
/// the channels, and an internal task handles the WebSocket I/O.
pub struct ConnectedClient {
    /// Send messages to the server.
    pub to_server: mpsc::Sender<ClientMessage>,
    /// Receive connection events and messages from the server.
    pub from_server: mpsc::Receiver<TransportEvent>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to a livetype server.
///
/// `server` is the HTTP(S) or WS(S) base URL. Failure here is final; drops
/// after this returns are retried in the background.
pub async fn connect(server: &str) -> Result<ConnectedClient, TransportError> {
    let url = endpoint(server)?;
    let (ws, handshake) = open_with_timeout(&url).await?;
    tracing::info!(%url, sid = %handshake.sid, "connected");

    let (to_server_tx, to_server_rx) = mpsc::channel::<ClientMessage>(CHANNEL_CAPACITY);
    let (from_server_tx, from_server_rx) = mpsc::channel::<TransportEvent>(CHANNEL_CAPACITY);

    let handle =
        tokio::spawn(run_connection(url, ws, handshake, to_server_rx, from_server_tx));

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// WebSocket URL of the Socket.IO endpoint for `server`.
pub fn endpoint(server: &str) -> Result<Url, TransportError> {
    let mut url =
        Url::parse(server).map_err(|e| TransportError::InvalidUrl(format!("{server}: {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TransportError::InvalidUrl(format!("unsupported scheme {other:?}")));
        },
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::InvalidUrl(format!("cannot use scheme {scheme}")))?;
    url.set_path(SOCKET_IO_PATH);
    url.set_query(Some(ENGINE_IO_QUERY));
    url.set_fragment(None);
    Ok(url)
}

/// Run the connection, bridging between channels and the WebSocket.
async fn run_connection(
    url: Url,
    mut ws: WsStream,
    mut handshake: Handshake,
    mut to_server: mpsc::Receiver<ClientMessage>,
    from_server: mpsc::Sender<TransportEvent>,
) {
    loop {
        if from_server.send(TransportEvent::Connected).await.is_err() {
            return;
        }

        let reason = match pump(&mut ws, &handshake, &mut to_server, &from_server).await {
            Ok(()) => {
                // Runtime dropped its end; say goodbye.
                let _ = ws.close(None).await;
                return;
            },
            Err(e) => e.to_string(),
        };

        tracing::warn!(%reason, "connection lost");
        if from_server.send(TransportEvent::Disconnected { reason }).await.is_err() {
            return;
        }

        let Some((next_ws, next_handshake)) = reconnect(&url, &mut to_server).await else {
            return;
        };
        ws = next_ws;
        handshake = next_handshake;
    }
}

/// Move traffic until the link fails. `Ok` means the runtime went away.
async fn pump(
    ws: &mut WsStream,
    handshake: &Handshake,
    to_server: &mut mpsc::Receiver<ClientMessage>,
    from_server: &mpsc::Sender<TransportEvent>,
) -> Result<(), TransportError> {
    let idle = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);
    let mut deadline = Instant::now() + idle;

    loop {
        tokio::select! {
            outgoing = to_server.recv() => {
                let Some(message) = outgoing else {
                    return Ok(());
                };
                tracing::debug!(event = message.event_name(), "send");
                send_packet(ws, &message.into_packet()?).await?;
            },
            incoming = next_text(ws) => {
                let text = incoming?;
                deadline = Instant::now() + idle;

                match Packet::decode(&text) {
                    Ok(Packet::Ping) => send_packet(ws, &Packet::Pong).await?,
                    Ok(packet @ Packet::Event { .. }) => match ServerMessage::from_packet(packet) {
                        Ok(message) => {
                            if from_server.send(TransportEvent::Message(message)).await.is_err() {
                                return Ok(());
                            }
                        },
                        Err(e) if e.is_unknown_event() => {
                            tracing::debug!(error = %e, "ignoring unknown event");
                        },
                        Err(e) => tracing::warn!(error = %e, "dropping malformed event"),
                    },
                    Ok(Packet::Close | Packet::Disconnect) => {
                        return Err(TransportError::Closed("server ended the session".into()));
                    },
                    Ok(Packet::ConnectError { message }) => {
                        return Err(TransportError::Handshake(message));
                    },
                    Ok(other) => tracing::trace!(?other, "ignoring packet"),
                    Err(e) => tracing::warn!(error = %e, %text, "undecodable packet"),
                }
            },
            () = tokio::time::sleep_until(deadline) => {
                return Err(TransportError::Timeout(idle));
            },
        }
    }
}

/// Retry until a new session is up. `None` means the runtime went away.
async fn reconnect(
    url: &Url,
    to_server: &mut mpsc::Receiver<ClientMessage>,
) -> Option<(WsStream, Handshake)> {
    let mut delay = RECONNECT_DELAY_MIN;

    loop {
        tokio::time::sleep(delay).await;

        match open_with_timeout(url).await {
            Ok((ws, handshake)) => {
                tracing::info!(%url, sid = %handshake.sid, "reconnected");
                return discard_stale(to_server).then_some((ws, handshake));
            },
            Err(e) => {
                tracing::warn!(error = %e, retry_in = ?delay, "reconnect failed");
            },
        }

        if to_server.is_closed() {
            return None;
        }
        delay = (delay * 2).min(RECONNECT_DELAY_MAX);
    }
}

/// Drop messages queued while disconnected. False if the runtime went away.
fn discard_stale(to_server: &mut mpsc::Receiver<ClientMessage>) -> bool {
    let mut dropped = 0usize;
    loop {
        match to_server.try_recv() {
            Ok(_) => dropped += 1,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, "discarded messages queued while disconnected");
    }
    true
}

async fn open_with_timeout(url: &Url) -> Result<(WsStream, Handshake), TransportError> {
    tokio::time::timeout(HANDSHAKE_TIMEOUT, open(url))
        .await
        .map_err(|_| TransportError::Timeout(HANDSHAKE_TIMEOUT))?
}

/// WebSocket upgrade, Engine.IO open, Socket.IO namespace connect.
async fn open(url: &Url) -> Result<(WsStream, Handshake), TransportError> {
    let (mut ws, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    let handshake = match Packet::decode(&next_text(&mut ws).await?)? {
        Packet::Open(handshake) => handshake,
        other => {
            return Err(TransportError::Handshake(format!("expected open packet, got {other:?}")));
        },
    };

    send_packet(&mut ws, &Packet::Connect { sid: None }).await?;

    loop {
        match Packet::decode(&next_text(&mut ws).await?)? {
            Packet::Connect { .. } => return Ok((ws, handshake)),
            Packet::ConnectError { message } => return Err(TransportError::Handshake(message)),
            Packet::Ping => send_packet(&mut ws, &Packet::Pong).await?,
            other => tracing::debug!(?other, "ignoring packet before namespace connect"),
        }
    }
}

/// Next text frame. Control and binary frames are skipped.
async fn next_text(ws: &mut WsStream) -> Result<String, TransportError> {
    loop {
        let Some(message) = ws.next().await else {
            return Err(TransportError::Closed("stream ended".into()));
        };
        match message.map_err(|e| TransportError::Connection(e.to_string()))? {
            Message::Text(text) => return Ok(text.as_str().to_string()),
            Message::Close(frame) => {
                let reason = frame.map_or_else(|| "no reason".to_string(), |f| f.reason.as_str().to_string());
                return Err(TransportError::Closed(reason));
            },
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {},
        }
    }
}

async fn send_packet(ws: &mut WsStream, packet: &Packet) -> Result<(), TransportError> {
    let text = packet.encode()?;
    ws.send(Message::text(text)).await.map_err(|e| TransportError::Connection(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn https_maps_to_wss_socket_io_endpoint() {
        let url = endpoint("https://classic.talkomatic.co").unwrap();
        assert_eq!(url.as_str(), "wss://classic.talkomatic.co/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn http_with_port_maps_to_ws() {
        let url = endpoint("http://localhost:3000/").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:3000/socket.io/?EIO=4&transport=websocket");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        assert!(matches!(endpoint("ftp://example.com"), Err(TransportError::InvalidUrl(_))));
        assert!(matches!(endpoint("not a url"), Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn stale_messages_are_discarded() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(ClientMessage::GetRooms).unwrap();
        tx.try_send(ClientMessage::LeaveRoom).unwrap();

        assert!(discard_stale(&mut rx));
        assert!(rx.try_recv().is_err());

        drop(tx);
        assert!(!discard_stale(&mut rx));
    }
}
