//! Client state machine.
//!
//! The `Client` owns the [`Session`] and the [`BufferStore`] for the current
//! room. It is the only component that produces wire messages.
//!
//! # Local edits
//!
//! The local line is mirrored into this client's own buffer as soon as an
//! edit is sent (self-echo). Diffs are always computed against that buffer,
//! so the op sent is exactly what every receiver will apply. With no own
//! buffer yet (first keystroke after joining or reconnecting) the whole line
//! is sent as a `full-replace`.

use std::time::Duration;

use livetype_core::{BufferStore, Environment, compute_diff, full_resync};
use livetype_proto::{
    ClientMessage, CreateRoom, JoinRoom, RemoteEdit, RoomJoined, RoomKind, ServerMessage, SignIn,
    SigninStatus, UserJoined, message::events,
};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent, ClientSnapshot},
    session::{Expired, Profile, Session, SessionState},
};

/// How long a join or create request may wait for the server (15 seconds).
pub const ROOM_ACTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for interacting with a livetype server.
pub struct Client<E: Environment> {
    /// Environment for timing.
    env: E,

    /// Identity, membership and pending requests.
    session: Session<E::Instant>,

    /// Buffers of every participant in the current room.
    buffers: BufferStore,
}

impl<E: Environment> Client<E> {
    /// Create a new client that will sign in with `profile`.
    pub fn new(env: E, profile: Profile) -> Self {
        Self { env, session: Session::new(profile), buffers: BufferStore::new() }
    }

    /// Session state machine.
    pub fn session(&self) -> &Session<E::Instant> {
        &self.session
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    /// Buffers of the current room.
    pub fn buffers(&self) -> &BufferStore {
        &self.buffers
    }

    /// Snapshot for tests and invariant checks.
    pub fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            state: self.session.state().clone(),
            connection_id: self.session.identity().map(|id| id.connection_id.clone()),
            pending_join: self.session.pending_join().cloned(),
            buffers: self
                .buffers
                .iter()
                .map(|b| (b.owner().to_string(), b.text().to_string()))
                .collect(),
        }
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connected => Ok(self.handle_connected()),
            ClientEvent::Disconnected { reason } => Ok(self.handle_disconnected(&reason)),
            ClientEvent::Received(message) => self.handle_message(message),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
            ClientEvent::RequestRooms => {
                self.require_signed_in("list rooms")?;
                Ok(vec![ClientAction::Send(ClientMessage::GetRooms)])
            },
            ClientEvent::CreateRoom { name, kind, layout, access_code } => {
                self.handle_create_room(name, kind, layout, access_code)
            },
            ClientEvent::JoinRoom { room_id, access_code } => {
                self.handle_join_room(room_id, access_code)
            },
            ClientEvent::LeaveRoom => self.handle_leave_room(),
            ClientEvent::LocalEdit { text } => Ok(self.handle_local_edit(text)),
        }
    }

    fn require_signed_in(&self, operation: &'static str) -> Result<(), ClientError> {
        if self.session.state().is_signed_in() {
            Ok(())
        } else {
            Err(ClientError::NotSignedIn { operation })
        }
    }

    /// Reset and sign in. Runs on every (re)connect.
    fn handle_connected(&mut self) -> Vec<ClientAction> {
        let mut actions = self.reset();

        let profile = self.session.profile();
        tracing::info!(username = %profile.username, location = %profile.location, "signing in");
        actions.push(ClientAction::Send(ClientMessage::JoinLobby(SignIn {
            username: profile.username.clone(),
            location: profile.location.clone(),
        })));
        actions
    }

    fn handle_disconnected(&mut self, reason: &str) -> Vec<ClientAction> {
        tracing::info!(reason, "disconnected");
        let mut actions = self.reset();
        actions.push(ClientAction::Notice { message: format!("Disconnected from server: {reason}") });
        actions
    }

    fn reset(&mut self) -> Vec<ClientAction> {
        self.buffers.clear();
        self.session
            .reset()
            .map(|room_id| ClientAction::RoomLeft { room_id })
            .into_iter()
            .collect()
    }

    fn handle_create_room(
        &mut self,
        name: String,
        kind: RoomKind,
        layout: String,
        access_code: Option<String>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.require_signed_in("create a room")?;

        let request = CreateRoom::new(name, kind, layout, access_code);
        tracing::info!(name = %request.name, kind = %request.kind, "creating room");
        self.session.begin_create(
            request.name.clone(),
            request.access_code.clone(),
            self.env.now(),
        );

        Ok(vec![ClientAction::Send(ClientMessage::CreateRoom(request))])
    }

    fn handle_join_room(
        &mut self,
        room_id: String,
        access_code: Option<String>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.require_signed_in("join a room")?;
        Ok(vec![self.request_join(room_id, access_code)])
    }

    fn request_join(&mut self, room_id: String, access_code: Option<String>) -> ClientAction {
        if let Some(superseded) = self.session.pending_join()
            && *superseded != room_id
        {
            tracing::debug!(%superseded, %room_id, "superseding pending join");
        }

        tracing::info!(%room_id, "joining room");
        self.session.begin_join(room_id.clone(), self.env.now());
        ClientAction::Send(ClientMessage::JoinRoom(JoinRoom::new(room_id, access_code)))
    }

    fn handle_leave_room(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.state().room().is_none() {
            return Err(ClientError::NotInRoom);
        }

        self.session.cancel_join();
        let mut actions = vec![ClientAction::Send(ClientMessage::LeaveRoom)];
        actions.extend(self.leave_room());
        Ok(actions)
    }

    /// Drop back to the lobby, clearing every buffer.
    fn leave_room(&mut self) -> Option<ClientAction> {
        self.buffers.clear();
        let room_id = self.session.leave()?;
        tracing::info!(%room_id, "left room");
        Some(ClientAction::RoomLeft { room_id })
    }

    fn handle_local_edit(&mut self, text: String) -> Vec<ClientAction> {
        if self.session.state().room().is_none() {
            tracing::trace!("local edit outside a room");
            return Vec::new();
        }
        let Some(identity) = self.session.identity() else {
            return Vec::new();
        };

        let op = match self.buffers.get(&identity.connection_id) {
            Some(own) => compute_diff(own.text(), &text),
            None => Some(full_resync(&text)),
        };
        let Some(op) = op else {
            return Vec::new();
        };

        tracing::debug!(kind = op.kind(), "sending edit");
        let buffer = self.buffers.apply(&identity.connection_id, &identity.username, &op);
        vec![
            ClientAction::Send(ClientMessage::ChatUpdate { diff: op }),
            ClientAction::BufferUpdated {
                user_id: buffer.owner().to_string(),
                username: buffer.username().to_string(),
                text: buffer.text().to_string(),
                is_local: true,
            },
        ]
    }

    /// Single dispatch point for everything the server sends.
    fn handle_message(
        &mut self,
        message: ServerMessage,
    ) -> Result<Vec<ClientAction>, ClientError> {
        tracing::debug!(event = message.event_name(), "received");

        match message {
            ServerMessage::SigninStatus(status) => self.handle_signin_status(status),
            ServerMessage::LobbyUpdate(rooms) => {
                self.session.replace_catalog(&rooms);
                Ok(vec![ClientAction::LobbyUpdated(rooms)])
            },
            ServerMessage::RoomCreated(room_id) => self.handle_room_created(room_id),
            ServerMessage::RoomJoined(joined) => self.handle_room_joined(joined),
            ServerMessage::AccessCodeRequired => {
                let room = self.session.cancel_join();
                tracing::info!(room = ?room, "access code required");
                Ok(vec![ClientAction::Notice {
                    message: "Access code required to join this room.".to_string(),
                }])
            },
            ServerMessage::ChatUpdate(edit) => self.handle_remote_edit(edit),
            ServerMessage::UserJoined(joined) => Ok(self.handle_user_joined(joined)),
            ServerMessage::UserLeft(user_id) => Ok(self.handle_user_left(&user_id)),
            ServerMessage::Error(message) => {
                tracing::warn!(%message, "server error");
                Ok(vec![ClientAction::ServerError { message }])
            },
        }
    }

    fn handle_signin_status(
        &mut self,
        status: SigninStatus,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.state().is_signed_in() {
            return Err(ClientError::UnexpectedMessage {
                event: events::SIGNIN_STATUS,
                reason: "already signed in".to_string(),
            });
        }

        let connection_id = status.user_id.filter(|id| !id.is_empty());
        let (true, Some(connection_id)) = (status.is_signed_in, connection_id) else {
            tracing::warn!(is_signed_in = status.is_signed_in, "sign-in failed");
            return Ok(vec![ClientAction::SignInFailed]);
        };

        let identity = self.session.sign_in(connection_id).clone();
        tracing::info!(connection_id = %identity.connection_id, "signed in");
        Ok(vec![ClientAction::SignedIn(identity), ClientAction::Send(ClientMessage::GetRooms)])
    }

    fn handle_room_created(&mut self, room_id: String) -> Result<Vec<ClientAction>, ClientError> {
        if !self.session.state().is_signed_in() {
            return Err(ClientError::UnexpectedMessage {
                event: events::ROOM_CREATED,
                reason: "not signed in".to_string(),
            });
        }

        if self.session.pending_create().is_none() {
            tracing::debug!(%room_id, "room created without a pending request");
        }
        let access_code = self.session.finish_create();
        Ok(vec![self.request_join(room_id, access_code)])
    }

    fn handle_room_joined(&mut self, joined: RoomJoined) -> Result<Vec<ClientAction>, ClientError> {
        let RoomJoined { room_id, room_name } = joined;

        let previous = match self.session.confirm_join(&room_id, &room_name) {
            Ok(previous) => previous,
            Err(pending) => {
                return Err(ClientError::UnexpectedRoomJoined { room_id, pending });
            },
        };

        self.buffers.clear();
        tracing::info!(%room_id, %room_name, "joined room");

        let mut actions = Vec::with_capacity(2);
        if let Some(previous) = previous {
            actions.push(ClientAction::RoomLeft { room_id: previous });
        }
        actions.push(ClientAction::RoomJoined { room_id, room_name });
        Ok(actions)
    }

    fn handle_remote_edit(&mut self, edit: RemoteEdit) -> Result<Vec<ClientAction>, ClientError> {
        let RemoteEdit { user_id, username, diff } = edit;

        if self.session.state().room().is_none() {
            tracing::warn!(%user_id, "chat update outside a room");
            return Ok(Vec::new());
        }
        if self.is_self(&user_id) {
            return Ok(Vec::new());
        }

        // A missing diff leaves the text alone but still makes the author visible.
        let buffer = match diff {
            Some(op) => {
                if !self.buffers.contains(&user_id) && !op.is_full_replace() {
                    tracing::debug!(
                        %user_id,
                        kind = op.kind(),
                        "first edit from author is relative"
                    );
                }
                self.buffers.apply(&user_id, &username, &op)
            },
            None => {
                tracing::debug!(%user_id, "chat update without diff");
                self.buffers.ensure(&user_id, &username);
                match self.buffers.get(&user_id) {
                    Some(buffer) => buffer,
                    None => return Ok(Vec::new()),
                }
            },
        };
        Ok(vec![ClientAction::BufferUpdated {
            user_id,
            username: buffer.username().to_string(),
            text: buffer.text().to_string(),
            is_local: false,
        }])
    }

    fn handle_user_joined(&mut self, joined: UserJoined) -> Vec<ClientAction> {
        let UserJoined { user_id, username, location } = joined;

        if self.session.state().room().is_none() {
            tracing::warn!(%username, "user joined outside a room");
            return Vec::new();
        }
        if let Some(id) = &user_id {
            if self.is_self(id) {
                return Vec::new();
            }
            self.buffers.ensure(id, &username);
        }

        tracing::info!(%username, "user joined");
        vec![ClientAction::PeerJoined { user_id, username, location }]
    }

    fn handle_user_left(&mut self, user_id: &str) -> Vec<ClientAction> {
        if self.session.state().room().is_none() {
            tracing::debug!(user_id, "user left outside a room");
            return Vec::new();
        }

        if self.is_self(user_id) {
            tracing::warn!("removed from room by server");
            let mut actions: Vec<_> = self.leave_room().into_iter().collect();
            actions.push(ClientAction::Notice { message: "Removed from the room".to_string() });
            return actions;
        }

        let removed = self.buffers.remove(user_id);
        tracing::info!(user_id, "user left");
        vec![ClientAction::PeerLeft {
            user_id: user_id.to_string(),
            username: removed.map(|b| b.username().to_string()),
        }]
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        self.session
            .expire(now, ROOM_ACTION_TIMEOUT)
            .into_iter()
            .map(|expired| {
                let message = match expired {
                    Expired::Join(room_id) => {
                        format!("Timed out waiting to join room {room_id}")
                    },
                    Expired::Create(name) => {
                        format!("Timed out waiting for room {name} to be created")
                    },
                };
                tracing::warn!(%message, "room request expired");
                ClientAction::Notice { message }
            })
            .collect()
    }

    fn is_self(&self, user_id: &str) -> bool {
        self.session.identity().is_some_and(|id| id.connection_id == user_id)
    }
}
