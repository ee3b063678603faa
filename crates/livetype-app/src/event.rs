//! Application input events.
//!
//! This module defines [`AppEvent`], the comprehensive set of inputs that drive
//! the [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Protocol notifications translated from the underlying client.

use livetype_proto::{RoomId, RoomSummary, UserId};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Connection in progress.
    Connecting,

    /// Transport connected; sign-in is under way.
    Connected,

    /// Transport lost the connection.
    Disconnected {
        /// Human-readable cause.
        reason: String,
    },

    /// Sign-in succeeded.
    SignedIn {
        /// Server-assigned id.
        connection_id: UserId,
        /// Display name.
        username: String,
        /// Location.
        location: String,
    },

    /// Server refused the sign-in.
    SignInFailed,

    /// Lobby catalog replaced.
    LobbyUpdated(Vec<RoomSummary>),

    /// Entered a room.
    RoomJoined {
        /// Room id.
        room_id: RoomId,
        /// Room name.
        room_name: String,
    },

    /// Left a room.
    RoomLeft {
        /// Room id.
        room_id: RoomId,
    },

    /// A participant's buffer changed.
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

    /// Participant entered the room.
    PeerJoined {
        /// Participant id, when known.
        user_id: Option<UserId>,
        /// Display name.
        username: String,
    },

    /// Participant left the room.
    PeerLeft {
        /// Participant id.
        user_id: UserId,
        /// Display name, when known.
        username: Option<String>,
    },

    /// Informational message.
    Notice {
        /// Message text.
        message: String,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
