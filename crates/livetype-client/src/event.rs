//! Client events and actions.

use livetype_proto::{ClientMessage, RoomId, RoomKind, RoomSummary, ServerMessage, UserId};

use crate::session::{Identity, SessionState};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Reporting transport state and decoded server messages
/// - Driving time forward via ticks
/// - Forwarding application intents (join room, local typing, etc.)
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulation environments.
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Transport (re)connected. Triggers sign-in.
    Connected,

    /// Transport lost the connection.
    Disconnected {
        /// Human-readable cause.
        reason: String,
    },

    /// Message received from the server.
    Received(ServerMessage),

    /// Time tick for timeout processing.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// Application wants a fresh lobby catalog.
    RequestRooms,

    /// Application wants to create a room.
    CreateRoom {
        /// Room name.
        name: String,
        /// Visibility.
        kind: RoomKind,
        /// Layout hint.
        layout: String,
        /// Access code for semi-private rooms.
        access_code: Option<String>,
    },

    /// Application wants to join a room.
    JoinRoom {
        /// Room to join.
        room_id: RoomId,
        /// Access code for semi-private rooms.
        access_code: Option<String>,
    },

    /// Application wants to leave the current room.
    LeaveRoom,

    /// The local line changed. `text` is the whole new line.
    LocalEdit {
        /// Current content of the local buffer.
        text: String,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Send a message to the server.
    Send(ClientMessage),

    /// Sign-in succeeded.
    SignedIn(Identity),

    /// Server refused the sign-in.
    SignInFailed,

    /// Lobby catalog replaced.
    LobbyUpdated(Vec<RoomSummary>),

    /// Entered a room. Any previous room's buffers are gone.
    RoomJoined {
        /// Room entered.
        room_id: RoomId,
        /// Room name.
        room_name: String,
    },

    /// Left a room (by request, removal, room switch or disconnect).
    RoomLeft {
        /// Room that was left.
        room_id: RoomId,
    },

    /// A buffer's text changed.
    BufferUpdated {
        /// Buffer owner.
        user_id: UserId,
        /// Owner's display name.
        username: String,
        /// Full new text.
        text: String,
        /// True for this client's own buffer.
        is_local: bool,
    },

    /// Another participant entered the room.
    PeerJoined {
        /// Participant id, when the server sent one.
        user_id: Option<UserId>,
        /// Display name.
        username: String,
        /// Location, when the server sent one.
        location: Option<String>,
    },

    /// Another participant left the room. Their buffer is gone.
    PeerLeft {
        /// Participant id.
        user_id: UserId,
        /// Display name, if we ever saw one.
        username: Option<String>,
    },

    /// Informational message for the user.
    Notice {
        /// Message text.
        message: String,
    },

    /// Error reported by the server, verbatim.
    ServerError {
        /// Message text.
        message: String,
    },
}

/// What the transport reports to the runtime.
///
/// Transport-agnostic so simulated transports can produce the same events as
/// the WebSocket one.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection (re)established and namespace joined.
    Connected,
    /// Connection lost.
    Disconnected {
        /// Human-readable cause.
        reason: String,
    },
    /// Decoded server message.
    Message(ServerMessage),
}

/// Read-only view of client state for tests and invariant checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    /// Lifecycle state.
    pub state: SessionState,
    /// Server-assigned id, once signed in.
    pub connection_id: Option<UserId>,
    /// Outstanding join request.
    pub pending_join: Option<RoomId>,
    /// `(owner, text)` of every buffer, in display order.
    pub buffers: Vec<(UserId, String)>,
}
