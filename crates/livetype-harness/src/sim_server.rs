//! In-memory chat server for simulation.
//!
//! `SimServer` models the room server the client talks to: sign-in, a lobby
//! catalog, public and semi-private rooms capped at [`ROOM_CAPACITY`], and
//! relay of every `chat update` to the author's room peers. It keeps its own
//! copy of each participant's text so tests can compare clients against it.
//!
//! There is no I/O. Tests (or [`crate::SimDriver`]) call [`SimServer::handle`]
//! with a connection's message and pick up each connection's deliveries with
//! [`SimServer::drain`]. Delivery order per connection is send order.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};

use livetype_core::apply_edit;
use livetype_proto::{
    ClientMessage, CreateRoom, EditOp, JoinRoom, ROOM_CAPACITY, RemoteEdit, RoomId, RoomJoined,
    RoomKind, RoomSummary, RoomUser, ServerMessage, SignIn, SigninStatus, UserId, UserJoined,
};

/// Server-side connection handle.
pub type ConnId = u64;

/// First room id handed out.
const FIRST_ROOM_ID: u64 = 100_000;

struct SimConnection {
    user_id: UserId,
    profile: Option<SignIn>,
    room: Option<RoomId>,
    inbox: VecDeque<ServerMessage>,
}

struct SimRoom {
    name: String,
    kind: RoomKind,
    layout: String,
    access_code: Option<String>,
    members: Vec<ConnId>,
    texts: BTreeMap<UserId, String>,
    /// A room closes when its last member leaves, not before the first joins.
    occupied: bool,
}

/// In-memory chat server.
pub struct SimServer {
    connections: BTreeMap<ConnId, SimConnection>,
    rooms: BTreeMap<RoomId, SimRoom>,
    next_conn: ConnId,
    next_room: u64,
}

impl Default for SimServer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimServer {
    /// Create an empty server.
    pub fn new() -> Self {
        Self {
            connections: BTreeMap::new(),
            rooms: BTreeMap::new(),
            next_conn: 1,
            next_room: FIRST_ROOM_ID,
        }
    }

    /// Accept a new connection.
    pub fn connect(&mut self) -> ConnId {
        let conn = self.next_conn;
        self.next_conn += 1;
        self.connections.insert(conn, SimConnection {
            user_id: format!("conn-{conn}"),
            profile: None,
            room: None,
            inbox: VecDeque::new(),
        });
        tracing::debug!(conn, "sim connection accepted");
        conn
    }

    /// Drop a connection, leaving its room.
    pub fn disconnect(&mut self, conn: ConnId) {
        self.leave(conn);
        self.connections.remove(&conn);
        self.close_empty_rooms();
    }

    /// Remove a connection from its room, telling it too.
    pub fn kick(&mut self, conn: ConnId) {
        let Some(user_id) = self.connections.get(&conn).map(|c| c.user_id.clone()) else {
            return;
        };
        if self.leave(conn) {
            self.deliver(conn, ServerMessage::UserLeft(user_id));
            self.close_empty_rooms();
        }
    }

    /// Take everything delivered to `conn` since the last drain.
    pub fn drain(&mut self, conn: ConnId) -> Vec<ServerMessage> {
        self.connections.get_mut(&conn).map(|c| c.inbox.drain(..).collect()).unwrap_or_default()
    }

    /// Returns true if any connection has undelivered messages.
    pub fn has_pending(&self) -> bool {
        self.connections.values().any(|c| !c.inbox.is_empty())
    }

    /// Process one message from `conn`.
    pub fn handle(&mut self, conn: ConnId, message: ClientMessage) {
        if !self.connections.contains_key(&conn) {
            tracing::warn!(conn, "message from unknown connection");
            return;
        }

        match message {
            ClientMessage::JoinLobby(profile) => self.sign_in(conn, profile),
            ClientMessage::GetRooms => {
                let catalog = self.catalog();
                self.deliver(conn, ServerMessage::LobbyUpdate(catalog));
            },
            ClientMessage::CreateRoom(request) => self.create_room(conn, request),
            ClientMessage::JoinRoom(request) => self.join_room(conn, request),
            ClientMessage::LeaveRoom => {
                if self.leave(conn) {
                    self.close_empty_rooms();
                    self.broadcast_lobby();
                }
            },
            ClientMessage::ChatUpdate { diff } => self.relay(conn, diff),
        }
    }

    fn sign_in(&mut self, conn: ConnId, profile: SignIn) {
        let accepted = !profile.username.trim().is_empty();
        let Some(connection) = self.connections.get_mut(&conn) else {
            return;
        };

        let status = if accepted {
            connection.profile = Some(profile);
            SigninStatus { is_signed_in: true, user_id: Some(connection.user_id.clone()) }
        } else {
            SigninStatus { is_signed_in: false, user_id: None }
        };
        self.deliver(conn, ServerMessage::SigninStatus(status));
    }

    fn create_room(&mut self, conn: ConnId, request: CreateRoom) {
        if !self.is_signed_in(conn) {
            self.deliver(conn, ServerMessage::Error("Not signed in".into()));
            return;
        }

        let room_id = self.next_room.to_string();
        self.next_room += 1;
        self.rooms.insert(room_id.clone(), SimRoom {
            name: request.name,
            kind: request.kind,
            layout: request.layout,
            access_code: request.access_code,
            members: Vec::new(),
            texts: BTreeMap::new(),
            occupied: false,
        });

        self.deliver(conn, ServerMessage::RoomCreated(room_id));
        self.broadcast_lobby();
    }

    fn join_room(&mut self, conn: ConnId, request: JoinRoom) {
        if !self.is_signed_in(conn) {
            self.deliver(conn, ServerMessage::Error("Not signed in".into()));
            return;
        }

        let refusal = match self.rooms.get(&request.room_id) {
            None => Some(ServerMessage::Error("Room not found".into())),
            Some(room)
                if room.members.len() >= ROOM_CAPACITY && !room.members.contains(&conn) =>
            {
                Some(ServerMessage::Error("Room is full".into()))
            },
            Some(room) => match (&room.access_code, &request.access_code) {
                (Some(_), None) if room.kind == RoomKind::SemiPrivate => {
                    Some(ServerMessage::AccessCodeRequired)
                },
                (Some(expected), Some(given)) if expected != given => {
                    Some(ServerMessage::Error("Incorrect access code".into()))
                },
                _ => None,
            },
        };
        if let Some(refusal) = refusal {
            self.deliver(conn, refusal);
            return;
        }

        // Rejoining the current room starts over, like joining any other.
        self.leave(conn);
        self.enter(conn, &request.room_id);
        self.close_empty_rooms();
        self.broadcast_lobby();
    }

    fn enter(&mut self, conn: ConnId, room_id: &RoomId) {
        let Some((user_id, profile)) = self.member(conn) else {
            return;
        };
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };

        let peers = room.members.clone();
        room.members.push(conn);
        room.occupied = true;
        room.texts.insert(user_id.clone(), String::new());
        let room_name = room.name.clone();

        if let Some(connection) = self.connections.get_mut(&conn) {
            connection.room = Some(room_id.clone());
        }

        self.deliver(conn, ServerMessage::RoomJoined(RoomJoined {
            room_id: room_id.clone(),
            room_name,
        }));

        // Bring the newcomer up to date with everyone already typing.
        for peer in &peers {
            let Some((peer_id, peer_profile)) = self.member(*peer) else {
                continue;
            };
            self.deliver(conn, ServerMessage::UserJoined(UserJoined {
                user_id: Some(peer_id.clone()),
                username: peer_profile.username.clone(),
                location: Some(peer_profile.location),
            }));
            let text = self.text_of(room_id, &peer_id).unwrap_or_default().to_string();
            if !text.is_empty() {
                self.deliver(conn, ServerMessage::ChatUpdate(RemoteEdit {
                    user_id: peer_id,
                    username: peer_profile.username,
                    diff: Some(EditOp::FullReplace { text }),
                }));
            }
        }

        for peer in peers {
            self.deliver(peer, ServerMessage::UserJoined(UserJoined {
                user_id: Some(user_id.clone()),
                username: profile.username.clone(),
                location: Some(profile.location.clone()),
            }));
        }
    }

    fn member(&self, conn: ConnId) -> Option<(UserId, SignIn)> {
        let connection = self.connections.get(&conn)?;
        Some((connection.user_id.clone(), connection.profile.clone()?))
    }

    /// Take `conn` out of its room. Returns true if it was in one.
    fn leave(&mut self, conn: ConnId) -> bool {
        let Some(connection) = self.connections.get_mut(&conn) else {
            return false;
        };
        let Some(room_id) = connection.room.take() else {
            return false;
        };
        let user_id = connection.user_id.clone();

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return true;
        };
        room.members.retain(|m| *m != conn);
        room.texts.remove(&user_id);
        let peers = room.members.clone();

        for peer in peers {
            self.deliver(peer, ServerMessage::UserLeft(user_id.clone()));
        }
        true
    }

    fn close_empty_rooms(&mut self) {
        self.rooms.retain(|_, room| !room.occupied || !room.members.is_empty());
    }

    fn relay(&mut self, conn: ConnId, diff: EditOp) {
        let Some(connection) = self.connections.get(&conn) else {
            return;
        };
        let (Some(room_id), Some(profile)) = (connection.room.clone(), connection.profile.clone())
        else {
            tracing::debug!(conn, "chat update outside a room dropped");
            return;
        };
        let user_id = connection.user_id.clone();

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        let text = room.texts.entry(user_id.clone()).or_default();
        *text = apply_edit(text, &diff);
        let peers: Vec<ConnId> = room.members.iter().copied().filter(|m| *m != conn).collect();

        for peer in peers {
            self.deliver(peer, ServerMessage::ChatUpdate(RemoteEdit {
                user_id: user_id.clone(),
                username: profile.username.clone(),
                diff: Some(diff.clone()),
            }));
        }
    }

    fn broadcast_lobby(&mut self) {
        let catalog = self.catalog();
        let lobby: Vec<ConnId> = self
            .connections
            .iter()
            .filter(|(_, c)| c.profile.is_some() && c.room.is_none())
            .map(|(id, _)| *id)
            .collect();
        for conn in lobby {
            self.deliver(conn, ServerMessage::LobbyUpdate(catalog.clone()));
        }
    }

    fn deliver(&mut self, conn: ConnId, message: ServerMessage) {
        if let Some(connection) = self.connections.get_mut(&conn) {
            connection.inbox.push_back(message);
        }
    }

    fn is_signed_in(&self, conn: ConnId) -> bool {
        self.connections.get(&conn).is_some_and(|c| c.profile.is_some())
    }

    /// Lobby catalog as the server would send it.
    pub fn catalog(&self) -> Vec<RoomSummary> {
        self.rooms
            .iter()
            .map(|(id, room)| RoomSummary {
                id: id.clone(),
                name: room.name.clone(),
                kind: room.kind,
                layout: room.layout.clone(),
                users: room
                    .members
                    .iter()
                    .filter_map(|m| self.connections.get(m))
                    .filter_map(|c| {
                        c.profile.as_ref().map(|p| RoomUser {
                            id: c.user_id.clone(),
                            username: p.username.clone(),
                            location: p.location.clone(),
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Server-assigned id of a connection.
    pub fn user_id(&self, conn: ConnId) -> Option<&str> {
        self.connections.get(&conn).map(|c| c.user_id.as_str())
    }

    /// Room a connection is in.
    pub fn room_of(&self, conn: ConnId) -> Option<&RoomId> {
        self.connections.get(&conn).and_then(|c| c.room.as_ref())
    }

    /// Ids of all open rooms.
    pub fn room_ids(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.keys()
    }

    /// Authoritative `(owner, text)` pairs of a room.
    pub fn texts(&self, room_id: &str) -> Option<&BTreeMap<UserId, String>> {
        self.rooms.get(room_id).map(|r| &r.texts)
    }

    /// Authoritative text of one participant.
    pub fn text_of(&self, room_id: &str, user_id: &str) -> Option<&str> {
        self.rooms.get(room_id)?.texts.get(user_id).map(String::as_str)
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

/// Server shared between several simulated drivers.
#[allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Create a shared server for testing.
pub fn create_shared_server() -> SharedSimServer {
    Arc::new(Mutex::new(SimServer::new()))
}
