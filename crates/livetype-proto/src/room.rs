//! Room catalog types.

use serde::{Deserialize, Serialize};

/// Opaque room identifier assigned by the server.
pub type RoomId = String;

/// Opaque connection identifier assigned by the server at sign-in.
pub type UserId = String;

/// Maximum number of participants in a room.
pub const ROOM_CAPACITY: usize = 5;

/// Room visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomKind {
    /// Anyone in the lobby may join.
    Public,
    /// Joining requires the room's access code.
    SemiPrivate,
}

impl RoomKind {
    /// Wire name of the room kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::SemiPrivate => "semi-private",
        }
    }
}

impl std::fmt::Display for RoomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant listed in the lobby catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomUser {
    /// Connection id.
    #[serde(deserialize_with = "crate::ids::deserialize")]
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Free-form location string.
    #[serde(default)]
    pub location: String,
}

/// One entry of the lobby catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room id.
    #[serde(deserialize_with = "crate::ids::deserialize")]
    pub id: RoomId,
    /// Room name.
    #[serde(default)]
    pub name: String,
    /// Visibility.
    #[serde(rename = "type")]
    pub kind: RoomKind,
    /// Layout hint for graphical clients.
    #[serde(default)]
    pub layout: String,
    /// Current participants.
    #[serde(default)]
    pub users: Vec<RoomUser>,
}

impl RoomSummary {
    /// Returns true if no more participants fit.
    pub fn is_full(&self) -> bool {
        self.users.len() >= ROOM_CAPACITY
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_decodes_server_shape() {
        let value = json!({
            "id": 123456,
            "name": "lounge",
            "type": "semi-private",
            "layout": "default",
            "users": [{"id": "abc", "username": "ann", "location": "Oslo"}],
        });

        let summary: RoomSummary = serde_json::from_value(value).expect("decode summary");

        assert_eq!(summary.id, "123456");
        assert_eq!(summary.kind, RoomKind::SemiPrivate);
        assert_eq!(summary.users.len(), 1);
        assert!(!summary.is_full());
    }
}
