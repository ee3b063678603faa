//! Chat protocol messages.
//!
//! [`ClientMessage`] is everything a client may emit and [`ServerMessage`] is
//! everything it may receive. Each variant corresponds to exactly one
//! Socket.IO event name; payload structs mirror the JSON the server speaks
//! (camelCase keys).

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    EditOp, Packet,
    errors::{ProtocolError, Result},
    ids,
    room::{RoomId, RoomKind, RoomSummary, UserId},
};

/// Socket.IO event names.
pub mod events {
    /// Sign in and enter the lobby.
    pub const JOIN_LOBBY: &str = "join lobby";
    /// Request the lobby catalog.
    pub const GET_ROOMS: &str = "get rooms";
    /// Create a room.
    pub const CREATE_ROOM: &str = "create room";
    /// Join a room.
    pub const JOIN_ROOM: &str = "join room";
    /// Leave the current room.
    pub const LEAVE_ROOM: &str = "leave room";
    /// Buffer edit, in both directions.
    pub const CHAT_UPDATE: &str = "chat update";
    /// Sign-in acknowledgment.
    pub const SIGNIN_STATUS: &str = "signin status";
    /// Full lobby catalog.
    pub const LOBBY_UPDATE: &str = "lobby update";
    /// Room creation acknowledgment.
    pub const ROOM_CREATED: &str = "room created";
    /// Room membership confirmation.
    pub const ROOM_JOINED: &str = "room joined";
    /// Join rejected until an access code is supplied.
    pub const ACCESS_CODE_REQUIRED: &str = "access code required";
    /// Peer entered the room.
    pub const USER_JOINED: &str = "user joined";
    /// Peer left the room.
    pub const USER_LEFT: &str = "user left";
    /// Server-reported error.
    pub const ERROR: &str = "error";
}

/// `join lobby` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignIn {
    /// Display name.
    pub username: String,
    /// Free-form location string.
    pub location: String,
}

/// `create room` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    /// Room name.
    pub name: String,
    /// Visibility.
    #[serde(rename = "type")]
    pub kind: RoomKind,
    /// Layout hint.
    pub layout: String,
    /// Access code for semi-private rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
}

impl CreateRoom {
    /// Build a request. An empty access code is treated as none.
    pub fn new(
        name: impl Into<String>,
        kind: RoomKind,
        layout: impl Into<String>,
        access_code: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            layout: layout.into(),
            access_code: access_code.filter(|code| !code.is_empty()),
        }
    }
}

/// `join room` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    /// Room to join.
    #[serde(deserialize_with = "ids::deserialize")]
    pub room_id: RoomId,
    /// Access code for semi-private rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
}

impl JoinRoom {
    /// Build a request. An empty access code is treated as none.
    pub fn new(room_id: impl Into<RoomId>, access_code: Option<String>) -> Self {
        Self { room_id: room_id.into(), access_code: access_code.filter(|code| !code.is_empty()) }
    }
}

/// `chat update` payload sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocalEdit {
    diff: EditOp,
}

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Sign in with username and location.
    JoinLobby(SignIn),
    /// Request the lobby catalog.
    GetRooms,
    /// Create a room.
    CreateRoom(CreateRoom),
    /// Join a room.
    JoinRoom(JoinRoom),
    /// Leave the current room.
    LeaveRoom,
    /// Broadcast an edit of the sender's own buffer.
    ChatUpdate {
        /// The edit.
        diff: EditOp,
    },
}

impl ClientMessage {
    /// Socket.IO event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinLobby(_) => events::JOIN_LOBBY,
            Self::GetRooms => events::GET_ROOMS,
            Self::CreateRoom(_) => events::CREATE_ROOM,
            Self::JoinRoom(_) => events::JOIN_ROOM,
            Self::LeaveRoom => events::LEAVE_ROOM,
            Self::ChatUpdate { .. } => events::CHAT_UPDATE,
        }
    }

    /// Convert into an event packet.
    pub fn into_packet(self) -> Result<Packet> {
        let name = self.event_name();
        let payload = match self {
            Self::JoinLobby(payload) => Some(serde_json::to_value(payload)?),
            Self::CreateRoom(payload) => Some(serde_json::to_value(payload)?),
            Self::JoinRoom(payload) => Some(serde_json::to_value(payload)?),
            Self::ChatUpdate { diff } => Some(serde_json::to_value(LocalEdit { diff })?),
            Self::GetRooms | Self::LeaveRoom => None,
        };
        Ok(Packet::event(name, payload))
    }

    /// Decode an event packet sent by a client.
    pub fn from_packet(packet: Packet) -> Result<Self> {
        let (name, payload) = event_parts(packet)?;
        match name.as_str() {
            events::JOIN_LOBBY => Ok(Self::JoinLobby(decode(events::JOIN_LOBBY, payload)?)),
            events::GET_ROOMS => Ok(Self::GetRooms),
            events::CREATE_ROOM => Ok(Self::CreateRoom(decode(events::CREATE_ROOM, payload)?)),
            events::JOIN_ROOM => Ok(Self::JoinRoom(decode(events::JOIN_ROOM, payload)?)),
            events::LEAVE_ROOM => Ok(Self::LeaveRoom),
            events::CHAT_UPDATE => {
                let LocalEdit { diff } = decode(events::CHAT_UPDATE, payload)?;
                Ok(Self::ChatUpdate { diff })
            },
            _ => Err(ProtocolError::UnknownEvent(name)),
        }
    }
}

/// `signin status` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninStatus {
    /// Whether the sign-in succeeded.
    #[serde(default)]
    pub is_signed_in: bool,
    /// Connection id assigned to this client.
    #[serde(
        default,
        deserialize_with = "ids::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<UserId>,
}

/// `room joined` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoined {
    /// Room now occupied.
    #[serde(deserialize_with = "ids::deserialize")]
    pub room_id: RoomId,
    /// Room name.
    #[serde(default)]
    pub room_name: String,
}

/// `chat update` payload relayed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEdit {
    /// Author of the edit.
    #[serde(deserialize_with = "ids::deserialize")]
    pub user_id: UserId,
    /// Author's display name.
    #[serde(default)]
    pub username: String,
    /// The edit. Absent edits leave the buffer untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<EditOp>,
}

/// `user joined` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserJoined {
    /// Connection id of the peer, when the server includes it.
    #[serde(
        default,
        deserialize_with = "ids::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<UserId>,
    /// Peer display name.
    #[serde(default)]
    pub username: String,
    /// Peer location, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Messages the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Sign-in acknowledgment.
    SigninStatus(SigninStatus),
    /// Full lobby catalog, replacing any previous one.
    LobbyUpdate(Vec<RoomSummary>),
    /// A room this client asked for was created.
    RoomCreated(RoomId),
    /// This client is now in a room.
    RoomJoined(RoomJoined),
    /// The last join needs an access code.
    AccessCodeRequired,
    /// A peer edited their buffer.
    ChatUpdate(RemoteEdit),
    /// A peer entered the room.
    UserJoined(UserJoined),
    /// A peer left the room.
    UserLeft(UserId),
    /// Server-reported error.
    Error(String),
}

impl ServerMessage {
    /// Socket.IO event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SigninStatus(_) => events::SIGNIN_STATUS,
            Self::LobbyUpdate(_) => events::LOBBY_UPDATE,
            Self::RoomCreated(_) => events::ROOM_CREATED,
            Self::RoomJoined(_) => events::ROOM_JOINED,
            Self::AccessCodeRequired => events::ACCESS_CODE_REQUIRED,
            Self::ChatUpdate(_) => events::CHAT_UPDATE,
            Self::UserJoined(_) => events::USER_JOINED,
            Self::UserLeft(_) => events::USER_LEFT,
            Self::Error(_) => events::ERROR,
        }
    }

    /// Convert into an event packet.
    pub fn into_packet(self) -> Result<Packet> {
        let name = self.event_name();
        let payload = match self {
            Self::SigninStatus(payload) => Some(serde_json::to_value(payload)?),
            Self::LobbyUpdate(rooms) => Some(serde_json::to_value(rooms)?),
            Self::RoomCreated(room_id) => Some(Value::String(room_id)),
            Self::RoomJoined(payload) => Some(serde_json::to_value(payload)?),
            Self::AccessCodeRequired => None,
            Self::ChatUpdate(payload) => Some(serde_json::to_value(payload)?),
            Self::UserJoined(payload) => Some(serde_json::to_value(payload)?),
            Self::UserLeft(user_id) => Some(Value::String(user_id)),
            Self::Error(message) => Some(Value::String(message)),
        };
        Ok(Packet::event(name, payload))
    }

    /// Decode an event packet sent by the server.
    pub fn from_packet(packet: Packet) -> Result<Self> {
        let (name, payload) = event_parts(packet)?;
        match name.as_str() {
            events::SIGNIN_STATUS => {
                Ok(Self::SigninStatus(decode(events::SIGNIN_STATUS, payload)?))
            },
            events::LOBBY_UPDATE => Ok(Self::LobbyUpdate(decode(events::LOBBY_UPDATE, payload)?)),
            events::ROOM_CREATED => Ok(Self::RoomCreated(
                ids::from_value(payload).map_err(|source| ProtocolError::InvalidPayload {
                    event: events::ROOM_CREATED,
                    source,
                })?,
            )),
            events::ROOM_JOINED => Ok(Self::RoomJoined(decode(events::ROOM_JOINED, payload)?)),
            events::ACCESS_CODE_REQUIRED => Ok(Self::AccessCodeRequired),
            events::CHAT_UPDATE => Ok(Self::ChatUpdate(decode(events::CHAT_UPDATE, payload)?)),
            events::USER_JOINED => Ok(Self::UserJoined(decode(events::USER_JOINED, payload)?)),
            events::USER_LEFT => Ok(Self::UserLeft(ids::from_value(payload).map_err(
                |source| ProtocolError::InvalidPayload { event: events::USER_LEFT, source },
            )?)),
            events::ERROR => Ok(Self::Error(match payload {
                Value::String(message) => message,
                Value::Null => "unknown error".to_string(),
                value => value
                    .get("message")
                    .and_then(Value::as_str)
                    .map_or_else(|| value.to_string(), str::to_string),
            })),
            _ => Err(ProtocolError::UnknownEvent(name)),
        }
    }
}

/// Split an event packet into its name and first argument.
fn event_parts(packet: Packet) -> Result<(String, Value)> {
    match packet {
        Packet::Event { name, args } => {
            let payload = args.into_iter().next().unwrap_or(Value::Null);
            Ok((name, payload))
        },
        other => Err(ProtocolError::MalformedEvent(format!("not an event packet: {other:?}"))),
    }
}

fn decode<T: DeserializeOwned>(event: &'static str, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|source| ProtocolError::InvalidPayload { event, source })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn server_event(name: &str, payload: Value) -> Result<ServerMessage> {
        ServerMessage::from_packet(Packet::Event { name: name.into(), args: vec![payload] })
    }

    #[test]
    fn chat_update_decodes_with_diff() {
        let message = server_event(
            "chat update",
            json!({"userId": "u2", "username": "bob", "diff": {"type": "add", "index": 0, "text": "x"}}),
        )
        .expect("decode");

        assert_eq!(
            message,
            ServerMessage::ChatUpdate(RemoteEdit {
                user_id: "u2".into(),
                username: "bob".into(),
                diff: Some(EditOp::Add { index: 0, text: "x".into() }),
            })
        );
    }

    #[test]
    fn chat_update_without_diff_is_empty() {
        let message =
            server_event("chat update", json!({"userId": "u2", "username": "bob"})).expect("decode");
        assert!(matches!(message, ServerMessage::ChatUpdate(RemoteEdit { diff: None, .. })));
    }

    #[test]
    fn room_created_accepts_numeric_id() {
        let message = server_event("room created", json!(42)).expect("decode");
        assert_eq!(message, ServerMessage::RoomCreated("42".into()));
    }

    #[test]
    fn access_code_required_has_no_payload() {
        let packet = Packet::decode(r#"42["access code required"]"#).expect("packet");
        let message = ServerMessage::from_packet(packet).expect("decode");
        assert_eq!(message, ServerMessage::AccessCodeRequired);
    }

    #[test]
    fn error_payload_object_uses_message() {
        let message = server_event("error", json!({"message": "Room is full"})).expect("decode");
        assert_eq!(message, ServerMessage::Error("Room is full".into()));
    }

    #[test]
    fn unknown_event_is_flagged() {
        let err = server_event("typing indicator", json!({})).expect_err("unknown");
        assert!(err.is_unknown_event());
    }

    #[test]
    fn join_room_omits_missing_access_code() {
        let packet = ClientMessage::JoinRoom(JoinRoom::new("7", Some(String::new())))
            .into_packet()
            .expect("encode");
        assert_eq!(packet.encode().ok().as_deref(), Some(r#"42["join room",{"roomId":"7"}]"#));
    }

    #[test]
    fn client_messages_decode_back() {
        let messages = vec![
            ClientMessage::JoinLobby(SignIn { username: "ann".into(), location: "Oslo".into() }),
            ClientMessage::GetRooms,
            ClientMessage::CreateRoom(CreateRoom::new(
                "lounge",
                RoomKind::SemiPrivate,
                "default",
                Some("abcd".into()),
            )),
            ClientMessage::JoinRoom(JoinRoom::new("42", Some("abcd".into()))),
            ClientMessage::LeaveRoom,
            ClientMessage::ChatUpdate { diff: EditOp::Delete { index: 1, count: 2 } },
        ];

        for message in messages {
            let packet = message.clone().into_packet().expect("encode");
            assert_eq!(ClientMessage::from_packet(packet).ok(), Some(message));
        }
    }
}
