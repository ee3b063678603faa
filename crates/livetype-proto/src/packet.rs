//! Engine.IO v4 / Socket.IO v4 text packets.
//!
//! Every WebSocket text frame carries one Engine.IO packet. Engine.IO type
//! `4` (message) wraps a Socket.IO packet, which is where events live:
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                  ping / pong
//! 40 / 40{"sid":".."}                                    namespace connect
//! 41                                                     namespace disconnect
//! 42["chat update",{"diff":{..}}]                        event
//! 44{"message":".."}                                     connect error
//! ```
//!
//! Only the default namespace is used. A namespace prefix (`/name,`) or an
//! acknowledgment id on inbound packets is tolerated and discarded.
//!
//! Binary attachments and HTTP long-polling are not supported.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// Engine.IO open handshake sent by the server as the first packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Transport upgrades offered by the server.
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Interval between server pings, in milliseconds.
    #[serde(default)]
    pub ping_interval: u64,
    /// Time the server waits for a pong, in milliseconds.
    #[serde(default)]
    pub ping_timeout: u64,
    /// Largest payload the server accepts, in bytes.
    #[serde(default)]
    pub max_payload: u64,
}

/// A decoded text packet.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Engine.IO open (`0`).
    Open(Handshake),
    /// Engine.IO close (`1`).
    Close,
    /// Engine.IO ping (`2`). Must be answered with [`Packet::Pong`].
    Ping,
    /// Engine.IO pong (`3`).
    Pong,
    /// Engine.IO noop (`6`).
    Noop,
    /// Socket.IO namespace connect (`40`).
    Connect {
        /// Socket.IO session id, present in server acknowledgments.
        sid: Option<String>,
    },
    /// Socket.IO namespace disconnect (`41`).
    Disconnect,
    /// Socket.IO event (`42`).
    Event {
        /// Event name.
        name: String,
        /// Event arguments following the name.
        args: Vec<Value>,
    },
    /// Socket.IO connect error (`44`).
    ConnectError {
        /// Server-provided reason.
        message: String,
    },
}

impl Packet {
    /// Build an event packet with at most one payload argument.
    pub fn event(name: impl Into<String>, payload: Option<Value>) -> Self {
        Self::Event { name: name.into(), args: payload.into_iter().collect() }
    }

    /// Encode the packet as WebSocket frame text.
    pub fn encode(&self) -> Result<String> {
        let text = match self {
            Self::Open(handshake) => format!("0{}", serde_json::to_string(handshake)?),
            Self::Close => "1".to_string(),
            Self::Ping => "2".to_string(),
            Self::Pong => "3".to_string(),
            Self::Noop => "6".to_string(),
            Self::Connect { sid: None } => "40".to_string(),
            Self::Connect { sid: Some(sid) } => {
                format!("40{}", serde_json::json!({ "sid": sid }))
            },
            Self::Disconnect => "41".to_string(),
            Self::Event { name, args } => {
                let mut array = Vec::with_capacity(args.len() + 1);
                array.push(Value::String(name.clone()));
                array.extend(args.iter().cloned());
                format!("42{}", serde_json::to_string(&array)?)
            },
            Self::ConnectError { message } => {
                format!("44{}", serde_json::json!({ "message": message }))
            },
        };
        Ok(text)
    }

    /// Decode WebSocket frame text.
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let Some(engine_type) = chars.next() else {
            return Err(ProtocolError::EmptyPacket);
        };
        let rest = chars.as_str();

        match engine_type {
            '0' => Ok(Self::Open(serde_json::from_str(rest)?)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping),
            '3' => Ok(Self::Pong),
            '6' => Ok(Self::Noop),
            '4' => decode_socket_packet(rest),
            other => Err(ProtocolError::UnknownPacketType(other.to_string())),
        }
    }
}

/// Decode the Socket.IO packet inside an Engine.IO message.
fn decode_socket_packet(text: &str) -> Result<Packet> {
    let mut chars = text.chars();
    let Some(socket_type) = chars.next() else {
        return Err(ProtocolError::EmptyPacket);
    };
    let body = skip_namespace(chars.as_str());

    match socket_type {
        '0' => {
            let sid = if body.is_empty() {
                None
            } else {
                serde_json::from_str::<Value>(body)?
                    .get("sid")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            Ok(Packet::Connect { sid })
        },
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(body.trim_start_matches(|c: char| c.is_ascii_digit())),
        '4' => {
            let message = match serde_json::from_str::<Value>(body)? {
                Value::String(message) => message,
                value => value
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| value.to_string(), str::to_string),
            };
            Ok(Packet::ConnectError { message })
        },
        other => Err(ProtocolError::UnknownPacketType(format!("4{other}"))),
    }
}

/// Strip a `/namespace,` prefix.
fn skip_namespace(body: &str) -> &str {
    if !body.starts_with('/') {
        return body;
    }
    body.split_once(',').map_or("", |(_, rest)| rest)
}

fn decode_event(body: &str) -> Result<Packet> {
    let array: Vec<Value> = serde_json::from_str(body)?;
    let mut values = array.into_iter();

    match values.next() {
        Some(Value::String(name)) => Ok(Packet::Event { name, args: values.collect() }),
        Some(other) => {
            Err(ProtocolError::MalformedEvent(format!("event name {other} is not a string")))
        },
        None => Err(ProtocolError::MalformedEvent("empty event array".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_open_handshake() {
        let text = r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        let packet = Packet::decode(text).expect("decode open");

        let Packet::Open(handshake) = packet else {
            panic!("expected open, got {packet:?}");
        };
        assert_eq!(handshake.sid, "abc");
        assert_eq!(handshake.ping_interval, 25000);
    }

    #[test]
    fn decodes_ping_and_connect() {
        assert_eq!(Packet::decode("2").ok(), Some(Packet::Ping));
        assert_eq!(Packet::decode("40").ok(), Some(Packet::Connect { sid: None }));
        assert_eq!(
            Packet::decode(r#"40{"sid":"xyz"}"#).ok(),
            Some(Packet::Connect { sid: Some("xyz".into()) })
        );
    }

    #[test]
    fn decodes_event_with_payload() {
        let packet = Packet::decode(r#"42["user left","u1"]"#).expect("decode event");
        assert_eq!(packet, Packet::Event { name: "user left".into(), args: vec![json!("u1")] });
    }

    #[test]
    fn event_tolerates_namespace_and_ack_id() {
        let packet = Packet::decode(r#"42/chat,17["get rooms"]"#).expect("decode event");
        assert_eq!(packet, Packet::Event { name: "get rooms".into(), args: vec![] });
    }

    #[test]
    fn connect_error_accepts_object_or_string() {
        assert_eq!(
            Packet::decode(r#"44{"message":"nope"}"#).ok(),
            Some(Packet::ConnectError { message: "nope".into() })
        );
        assert_eq!(
            Packet::decode(r#"44"nope""#).ok(),
            Some(Packet::ConnectError { message: "nope".into() })
        );
    }

    #[test]
    fn encodes_event_without_payload() {
        let text = Packet::event("leave room", None).encode().expect("encode");
        assert_eq!(text, r#"42["leave room"]"#);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Packet::decode("").is_err());
        assert!(Packet::decode("9").is_err());
        assert!(Packet::decode("42").is_err());
        assert!(Packet::decode("42[]").is_err());
        assert!(Packet::decode("42[1,2]").is_err());
        assert!(Packet::decode("47").is_err());
    }
}
