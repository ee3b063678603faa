//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding wire data.
///
/// Decoding errors never indicate a local bug: the peer sent something we do
/// not understand. Callers log them and keep the connection alive.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Packet text was empty.
    #[error("empty packet")]
    EmptyPacket,

    /// Engine.IO or Socket.IO packet type is not recognized.
    #[error("unknown packet type {0:?}")]
    UnknownPacketType(String),

    /// Event packet did not carry a `["name", ...]` array.
    #[error("malformed event packet: {0}")]
    MalformedEvent(String),

    /// Event name is not part of the protocol.
    #[error("unknown event {0:?}")]
    UnknownEvent(String),

    /// Event payload did not match the expected shape.
    #[error("invalid payload for {event:?}: {source}")]
    InvalidPayload {
        /// Event whose payload failed to decode.
        event: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON encoding or decoding failed outside of a known event.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Returns true if the peer sent an event this client does not know.
    ///
    /// Unknown events are expected when the server is newer than the client
    /// and are ignored rather than surfaced.
    pub fn is_unknown_event(&self) -> bool {
        matches!(self, Self::UnknownEvent(_))
    }
}
