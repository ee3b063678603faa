//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use std::collections::BTreeMap;

use livetype_client::ClientSnapshot;
use livetype_proto::{RoomId, UserId};

use crate::SimServer;

/// Snapshot of the entire system state.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state, labelled for error messages.
    pub clients: Vec<(String, ClientSnapshot)>,
    /// Server-side room state. Empty when no server is modelled.
    pub rooms: Vec<RoomSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(label: impl Into<String>, client: ClientSnapshot) -> Self {
        Self { clients: vec![(label.into(), client)], rooms: Vec::new() }
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, label: impl Into<String>, client: ClientSnapshot) {
        self.clients.push((label.into(), client));
    }

    /// Record every open room of `server`.
    #[must_use]
    pub fn with_server(mut self, server: &SimServer) -> Self {
        self.rooms = server
            .room_ids()
            .filter_map(|id| {
                let texts = server.texts(id)?.clone();
                Some(RoomSnapshot { room_id: id.clone(), texts })
            })
            .collect();
        self
    }

    /// Server view of a room.
    pub fn room(&self, room_id: &str) -> Option<&RoomSnapshot> {
        self.rooms.iter().find(|r| r.room_id == room_id)
    }
}

/// Server-side view of a room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomSnapshot {
    /// Room id.
    pub room_id: RoomId,
    /// Authoritative text of every member.
    pub texts: BTreeMap<UserId, String>,
}
