//! Session lifecycle.
//!
//! ```text
//! Unauthenticated --signin ok--> Lobby --room joined--> InRoom(id)
//!        ^                         ^                       |
//!        |                         +--leave / removed------+
//!        +---------- connect / disconnect (from any state) -+
//! ```
//!
//! The session also owns the lobby catalog and the bookkeeping for room
//! requests still waiting for the server: at most one join and one create.
//! A newer request of the same kind supersedes the older one.

use std::{collections::BTreeMap, time::Duration};

use livetype_proto::{RoomId, RoomSummary, UserId};

/// Who this client says it is.
///
/// Sent with every sign-in. Not validated locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Display name.
    pub username: String,
    /// Free-form location shown next to the name.
    pub location: String,
}

impl Profile {
    /// Create a profile.
    pub fn new(username: impl Into<String>, location: impl Into<String>) -> Self {
        Self { username: username.into(), location: location.into() }
    }
}

/// Identity assigned by the server at sign-in.
///
/// Immutable for the lifetime of one connection. `connection_id` keys this
/// client's own buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Server-assigned user id.
    pub connection_id: UserId,
    /// Display name.
    pub username: String,
    /// Location.
    pub location: String,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Connected (or not) but not signed in.
    #[default]
    Unauthenticated,
    /// Signed in, not in a room.
    Lobby,
    /// Member of the given room.
    InRoom(RoomId),
}

impl SessionState {
    /// Room the session is in, if any.
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            Self::InRoom(room_id) => Some(room_id),
            Self::Unauthenticated | Self::Lobby => None,
        }
    }

    /// Returns true once sign-in has succeeded.
    pub fn is_signed_in(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }
}

/// Join request waiting for `room joined`.
#[derive(Debug, Clone)]
struct PendingJoin<I> {
    room_id: RoomId,
    requested_at: I,
}

/// Create request waiting for `room created`.
#[derive(Debug, Clone)]
struct PendingCreate<I> {
    name: String,
    access_code: Option<String>,
    requested_at: I,
}

/// Room request that was dropped after waiting too long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expired {
    /// Join for the given room.
    Join(RoomId),
    /// Creation of the named room.
    Create(String),
}

/// Session state machine.
///
/// Generic over `I` (Instant type) so acknowledgment timeouts run on virtual
/// time in simulation.
#[derive(Debug, Clone)]
pub struct Session<I> {
    profile: Profile,
    identity: Option<Identity>,
    state: SessionState,
    room_name: Option<String>,
    pending_join: Option<PendingJoin<I>>,
    pending_create: Option<PendingCreate<I>>,
    catalog: BTreeMap<RoomId, RoomSummary>,
}

impl<I: Copy + Ord + std::ops::Sub<Output = Duration>> Session<I> {
    /// Create an unauthenticated session.
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            identity: None,
            state: SessionState::Unauthenticated,
            room_name: None,
            pending_join: None,
            pending_create: None,
            catalog: BTreeMap::new(),
        }
    }

    /// Profile used to sign in.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Identity assigned at sign-in.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Name of the current room, as reported when it was joined.
    pub fn room_name(&self) -> Option<&str> {
        self.room_name.as_deref()
    }

    /// Room of the outstanding join request.
    pub fn pending_join(&self) -> Option<&RoomId> {
        self.pending_join.as_ref().map(|p| &p.room_id)
    }

    /// Name of the room whose creation is outstanding.
    pub fn pending_create(&self) -> Option<&str> {
        self.pending_create.as_ref().map(|p| p.name.as_str())
    }

    /// Last lobby catalog received.
    pub fn catalog(&self) -> impl Iterator<Item = &RoomSummary> {
        self.catalog.values()
    }

    /// Look up a room in the catalog.
    pub fn room_summary(&self, room_id: &str) -> Option<&RoomSummary> {
        self.catalog.get(room_id)
    }

    /// Forget everything tied to the connection.
    ///
    /// Returns the room the session was in.
    pub(crate) fn reset(&mut self) -> Option<RoomId> {
        let previous = self.leave();
        self.identity = None;
        self.state = SessionState::Unauthenticated;
        self.pending_join = None;
        self.pending_create = None;
        self.catalog.clear();
        previous
    }

    pub(crate) fn sign_in(&mut self, connection_id: UserId) -> &Identity {
        self.state = SessionState::Lobby;
        self.identity.insert(Identity {
            connection_id,
            username: self.profile.username.clone(),
            location: self.profile.location.clone(),
        })
    }

    pub(crate) fn replace_catalog(&mut self, rooms: &[RoomSummary]) {
        self.catalog = rooms.iter().map(|room| (room.id.clone(), room.clone())).collect();
    }

    pub(crate) fn begin_join(&mut self, room_id: RoomId, now: I) {
        self.pending_join = Some(PendingJoin { room_id, requested_at: now });
    }

    pub(crate) fn cancel_join(&mut self) -> Option<RoomId> {
        self.pending_join.take().map(|p| p.room_id)
    }

    /// Move into `room_id` if it is the room we asked for.
    ///
    /// On success returns the room that was left by switching, if any. On
    /// failure returns the outstanding request and changes nothing.
    pub(crate) fn confirm_join(
        &mut self,
        room_id: &str,
        room_name: &str,
    ) -> Result<Option<RoomId>, Option<RoomId>> {
        match &self.pending_join {
            Some(pending) if pending.room_id == room_id && self.state.is_signed_in() => {},
            other => return Err(other.as_ref().map(|p| p.room_id.clone())),
        }

        self.pending_join = None;
        self.room_name = Some(room_name.to_string());
        let previous = match std::mem::replace(&mut self.state, SessionState::InRoom(room_id.into()))
        {
            SessionState::InRoom(previous) => Some(previous),
            SessionState::Lobby | SessionState::Unauthenticated => None,
        };
        Ok(previous)
    }

    pub(crate) fn begin_create(&mut self, name: String, access_code: Option<String>, now: I) {
        self.pending_create = Some(PendingCreate { name, access_code, requested_at: now });
    }

    /// Forget the outstanding create and hand back its access code.
    pub(crate) fn finish_create(&mut self) -> Option<String> {
        self.pending_create.take().and_then(|p| p.access_code)
    }

    /// Return to the lobby. Returns the room that was left.
    pub(crate) fn leave(&mut self) -> Option<RoomId> {
        self.room_name = None;
        match std::mem::replace(&mut self.state, SessionState::Lobby) {
            SessionState::InRoom(room_id) => Some(room_id),
            SessionState::Lobby => None,
            SessionState::Unauthenticated => {
                self.state = SessionState::Unauthenticated;
                None
            },
        }
    }

    /// Drop requests older than `timeout`.
    pub(crate) fn expire(&mut self, now: I, timeout: Duration) -> Vec<Expired> {
        let mut expired = Vec::new();

        if let Some(pending) = &self.pending_join
            && now - pending.requested_at >= timeout
        {
            expired.push(Expired::Join(pending.room_id.clone()));
            self.pending_join = None;
        }

        if let Some(pending) = &self.pending_create
            && now - pending.requested_at >= timeout
        {
            expired.push(Expired::Create(pending.name.clone()));
            self.pending_create = None;
        }

        expired
    }
}
