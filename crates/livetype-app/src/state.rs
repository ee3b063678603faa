//! Observable application state types.
//!
//! This module defines the data structures that represent the application's
//! current view of the world, such as [`RoomView`] and [`ConnectionState`].
//!
//! These structures serve as the "View Model" for the application. They hold
//! what the UI renders and nothing of the wire protocol.

use livetype_proto::{ROOM_CAPACITY, RoomId, RoomSummary, UserId};

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to server.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Transport is up, sign-in pending.
    Connected,
    /// Signed in.
    SignedIn {
        /// Server-assigned connection id.
        connection_id: UserId,
    },
}

/// One participant's live buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    /// Buffer owner.
    pub user_id: UserId,
    /// Pane title.
    pub username: String,
    /// Current buffer content.
    pub text: String,
    /// True for this client's own pane.
    pub is_local: bool,
}

/// The room the user is in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    /// Room id.
    pub room_id: RoomId,
    /// Room name.
    pub room_name: String,
    /// Panes in first-seen order.
    pub panes: Vec<Pane>,
    /// Presence notices for this room.
    pub system_messages: Vec<String>,
}

impl RoomView {
    /// Empty view of a freshly joined room.
    pub fn new(room_id: RoomId, room_name: String) -> Self {
        Self { room_id, room_name, panes: Vec::new(), system_messages: Vec::new() }
    }

    /// Pane owned by `user_id`, if any.
    pub fn pane(&self, user_id: &str) -> Option<&Pane> {
        self.panes.iter().find(|p| p.user_id == user_id)
    }

    pub(crate) fn upsert(&mut self, user_id: UserId, username: String, text: String, is_local: bool) {
        match self.panes.iter_mut().find(|p| p.user_id == user_id) {
            Some(pane) => {
                if !username.is_empty() {
                    pane.username = username;
                }
                pane.text = text;
                pane.is_local = is_local;
            },
            None => self.panes.push(Pane { user_id, username, text, is_local }),
        }
    }

    pub(crate) fn remove(&mut self, user_id: &str) -> Option<Pane> {
        let index = self.panes.iter().position(|p| p.user_id == user_id)?;
        Some(self.panes.remove(index))
    }
}

/// One lobby line: `"{id}: {name} ({n}/5 users) [{type}]"`.
pub fn room_line(room: &RoomSummary) -> String {
    format!(
        "{}: {} ({}/{} users) [{}]",
        room.id,
        room.name,
        room.users.len(),
        ROOM_CAPACITY,
        room.kind
    )
}
