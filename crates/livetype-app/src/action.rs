//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use livetype_proto::{RoomId, RoomKind};

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to server.
    Connect {
        /// Server base URL.
        server: String,
    },

    /// Ask for the lobby catalog.
    RequestRooms,

    /// Create a room.
    CreateRoom {
        /// Room name.
        name: String,
        /// Visibility.
        kind: RoomKind,
        /// Access code for semi-private rooms.
        access_code: Option<String>,
    },

    /// Join a room.
    JoinRoom {
        /// Room to join.
        room_id: RoomId,
        /// Access code for semi-private rooms.
        access_code: Option<String>,
    },

    /// Leave the current room.
    LeaveRoom,

    /// The local line changed while in a room.
    SendEdit {
        /// Whole line content.
        text: String,
    },
}
