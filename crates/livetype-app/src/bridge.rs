//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the low-level [`livetype_client::Client`] and adapts
//! it to the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into client events.
//! - Accumulates outgoing [`ClientMessage`]s to be sent by the driver in the
//!   next I/O cycle.
//! - Interprets results from the client and converts them back into
//!   [`crate::AppEvent`]s to update the UI.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic simulation.

use livetype_client::{
    Client, ClientAction, ClientError, ClientEvent, Environment, Profile, TransportEvent,
};
use livetype_proto::ClientMessage;

use crate::{AppAction, AppEvent};

/// Layout hint sent with every room this client creates.
pub const DEFAULT_LAYOUT: &str = "default";

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and simulation.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<ClientMessage>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment and profile.
    pub fn new(env: E, profile: Profile) -> Self {
        Self { client: Client::new(env, profile), outgoing: Vec::new() }
    }

    /// Underlying protocol client.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::RequestRooms => ClientEvent::RequestRooms,
            AppAction::CreateRoom { name, kind, access_code } => {
                ClientEvent::CreateRoom { name, kind, layout: DEFAULT_LAYOUT.into(), access_code }
            },
            AppAction::JoinRoom { room_id, access_code } => {
                ClientEvent::JoinRoom { room_id, access_code }
            },
            AppAction::LeaveRoom => ClientEvent::LeaveRoom,
            AppAction::SendEdit { text } => ClientEvent::LocalEdit { text },
            AppAction::Render | AppAction::Quit | AppAction::Connect { .. } => return vec![],
        };

        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Handle a transport notification.
    pub fn handle_transport(&mut self, event: TransportEvent) -> Vec<AppEvent> {
        match event {
            TransportEvent::Connected => {
                let result = self.client.handle(ClientEvent::Connected);
                let mut events = vec![AppEvent::Connected];
                events.extend(self.handle_client_result(result));
                events
            },
            TransportEvent::Disconnected { reason } => {
                let result = self.client.handle(ClientEvent::Disconnected { reason: reason.clone() });
                let mut events = self.handle_client_result(result);
                events.push(AppEvent::Disconnected { reason });
                events
            },
            TransportEvent::Message(message) => {
                let result = self.client.handle(ClientEvent::Received(message));
                self.handle_client_result(result)
            },
        }
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// Take pending outgoing messages.
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => {
                if e.is_anomaly() {
                    tracing::warn!(error = %e, "protocol anomaly");
                }
                vec![AppEvent::Error { message: e.to_string() }]
            },
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Send(message) => {
                    self.outgoing.push(message);
                },
                ClientAction::SignedIn(identity) => {
                    events.push(AppEvent::SignedIn {
                        connection_id: identity.connection_id,
                        username: identity.username,
                        location: identity.location,
                    });
                },
                ClientAction::SignInFailed => events.push(AppEvent::SignInFailed),
                ClientAction::LobbyUpdated(rooms) => events.push(AppEvent::LobbyUpdated(rooms)),
                ClientAction::RoomJoined { room_id, room_name } => {
                    events.push(AppEvent::RoomJoined { room_id, room_name });
                },
                ClientAction::RoomLeft { room_id } => events.push(AppEvent::RoomLeft { room_id }),
                ClientAction::BufferUpdated { user_id, username, text, is_local } => {
                    events.push(AppEvent::BufferUpdated { user_id, username, text, is_local });
                },
                ClientAction::PeerJoined { user_id, username, .. } => {
                    events.push(AppEvent::PeerJoined { user_id, username });
                },
                ClientAction::PeerLeft { user_id, username } => {
                    events.push(AppEvent::PeerLeft { user_id, username });
                },
                ClientAction::Notice { message } => events.push(AppEvent::Notice { message }),
                ClientAction::ServerError { message } => events.push(AppEvent::Error { message }),
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use livetype_core::env::test_utils::MockEnv;
    use livetype_proto::{EditOp, RemoteEdit, RoomJoined, ServerMessage, SigninStatus};

    use super::*;

    fn signed_in() -> Bridge<MockEnv> {
        let mut bridge = Bridge::new(MockEnv::new(), Profile::new("ann", "Oslo"));
        let _ = bridge.handle_transport(TransportEvent::Connected);
        let _ = bridge.handle_transport(TransportEvent::Message(ServerMessage::SigninStatus(
            SigninStatus { is_signed_in: true, user_id: Some("me".into()) },
        )));
        let _ = bridge.take_outgoing();
        bridge
    }

    fn joined() -> Bridge<MockEnv> {
        let mut bridge = signed_in();
        let _ = bridge
            .process_app_action(AppAction::JoinRoom { room_id: "7".into(), access_code: None });
        let _ = bridge.handle_transport(TransportEvent::Message(ServerMessage::RoomJoined(
            RoomJoined { room_id: "7".into(), room_name: "lounge".into() },
        )));
        let _ = bridge.take_outgoing();
        bridge
    }

    #[test]
    fn connect_signs_in() {
        let mut bridge = Bridge::new(MockEnv::new(), Profile::new("ann", "Oslo"));
        let events = bridge.handle_transport(TransportEvent::Connected);

        assert_eq!(events, vec![AppEvent::Connected]);
        assert!(matches!(bridge.take_outgoing().as_slice(), [ClientMessage::JoinLobby(_)]));
    }

    #[test]
    fn signin_status_becomes_signed_in() {
        let mut bridge = Bridge::new(MockEnv::new(), Profile::new("ann", "Oslo"));
        let _ = bridge.handle_transport(TransportEvent::Connected);
        let events = bridge.handle_transport(TransportEvent::Message(
            ServerMessage::SigninStatus(SigninStatus {
                is_signed_in: true,
                user_id: Some("me".into()),
            }),
        ));

        assert_eq!(events, vec![AppEvent::SignedIn {
            connection_id: "me".into(),
            username: "ann".into(),
            location: "Oslo".into(),
        }]);
    }

    #[test]
    fn create_room_carries_default_layout() {
        for (kind, access_code) in [
            (livetype_proto::RoomKind::Public, None),
            (livetype_proto::RoomKind::SemiPrivate, Some("abcd".to_string())),
        ] {
            let mut bridge = signed_in();
            let _ = bridge.process_app_action(AppAction::CreateRoom {
                name: "den".into(),
                kind,
                access_code,
            });

            let outgoing = bridge.take_outgoing();
            assert!(matches!(
                outgoing.as_slice(),
                [ClientMessage::CreateRoom(request)] if request.layout == "default"
            ));
        }
    }

    #[test]
    fn send_edit_produces_outgoing_diff() {
        let mut bridge = joined();
        let events = bridge.process_app_action(AppAction::SendEdit { text: "hi".into() });

        assert!(matches!(events.as_slice(), [AppEvent::BufferUpdated { is_local: true, .. }]));
        assert!(matches!(bridge.take_outgoing().as_slice(), [ClientMessage::ChatUpdate { .. }]));
    }

    #[test]
    fn remote_edit_updates_buffer() {
        let mut bridge = joined();
        let events = bridge.handle_transport(TransportEvent::Message(ServerMessage::ChatUpdate(
            RemoteEdit {
                user_id: "bob".into(),
                username: "Bob".into(),
                diff: Some(EditOp::Add { index: 0, text: "yo".into() }),
            },
        )));

        assert_eq!(events, vec![AppEvent::BufferUpdated {
            user_id: "bob".into(),
            username: "Bob".into(),
            text: "yo".into(),
            is_local: false,
        }]);
    }

    #[test]
    fn client_error_surfaces_as_error_event() {
        let mut bridge = signed_in();
        let events = bridge.process_app_action(AppAction::LeaveRoom);

        assert!(matches!(events.as_slice(), [AppEvent::Error { .. }]));
        assert!(bridge.take_outgoing().is_empty());
    }

    #[test]
    fn disconnect_reports_room_left_then_disconnected() {
        let mut bridge = joined();
        let events =
            bridge.handle_transport(TransportEvent::Disconnected { reason: "closed".into() });

        assert!(matches!(events.first(), Some(AppEvent::RoomLeft { .. })));
        assert_eq!(events.last(), Some(&AppEvent::Disconnected { reason: "closed".into() }));
    }
}
