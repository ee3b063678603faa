//! Test cluster simulation for convergence testing.
//!
//! Several App/Bridge pairs talk to one [`SimServer`] with no async runtime.
//! Every call runs to completion: user actions go through the Bridge, their
//! messages reach the server, and [`TestCluster::deliver`] pumps server
//! deliveries back into the clients until nothing is left in flight.

use std::time::Duration;

use livetype_app::{App, AppAction, AppEvent, Bridge, KeyInput};
use livetype_client::{Environment, Profile, TransportEvent};
use livetype_proto::RoomId;

use crate::{ConnId, SimEnv, SimServer, SystemSnapshot};

/// Upper bound on delivery rounds; a correct exchange settles in a handful.
const MAX_DELIVERY_ROUNDS: usize = 64;

/// One simulated participant.
pub struct Node {
    /// Label used in invariant messages (the username).
    pub label: String,
    /// Current server connection.
    pub conn: ConnId,
    /// UI state machine.
    pub app: App,
    /// Protocol bridge.
    pub bridge: Bridge<SimEnv>,
}

/// Simulated cluster of clients sharing one in-memory server and clock.
pub struct TestCluster {
    /// Shared clock.
    pub env: SimEnv,
    /// The server.
    pub server: SimServer,
    /// Participants, in creation order.
    pub nodes: Vec<Node>,
}

impl TestCluster {
    /// Connect and sign in one client per username.
    pub fn new(usernames: &[&str]) -> Self {
        let env = SimEnv::new();
        let mut server = SimServer::new();
        let nodes = usernames
            .iter()
            .map(|name| {
                let profile = Profile::new(*name, "Sim");
                Node {
                    label: (*name).to_string(),
                    conn: server.connect(),
                    app: App::new("sim://server".into(), profile.username.clone(), "Sim".into()),
                    bridge: Bridge::new(env.clone(), profile),
                }
            })
            .collect();

        let mut cluster = Self { env, server, nodes };
        for i in 0..cluster.nodes.len() {
            cluster.transport(i, TransportEvent::Connected);
        }
        cluster.deliver();
        cluster
    }

    /// Press one key on node `i`.
    pub fn press(&mut self, i: usize, key: KeyInput) {
        let actions = self.nodes[i].app.handle(AppEvent::Key(key));
        self.run_actions(i, actions);
    }

    /// Type `text` on node `i`, one keystroke per character.
    pub fn type_text(&mut self, i: usize, text: &str) {
        for c in text.chars() {
            self.press(i, KeyInput::Char(c));
        }
    }

    /// Type `line` on node `i` and press Enter.
    pub fn submit(&mut self, i: usize, line: &str) {
        self.type_text(i, line);
        self.press(i, KeyInput::Enter);
    }

    /// Node `i` creates a public room and joins it. Returns the room id.
    pub fn open_room(&mut self, i: usize, name: &str) -> Option<RoomId> {
        self.submit(i, &format!("create {name}"));
        self.deliver();
        self.room_of(i)
    }

    /// Node `i` joins `room_id`.
    pub fn join(&mut self, i: usize, room_id: &str) {
        self.submit(i, &format!("join {room_id}"));
        self.deliver();
    }

    /// Pump server deliveries into clients until none remain.
    pub fn deliver(&mut self) {
        for _ in 0..MAX_DELIVERY_ROUNDS {
            if !self.server.has_pending() {
                return;
            }
            for i in 0..self.nodes.len() {
                let conn = self.nodes[i].conn;
                for message in self.server.drain(conn) {
                    self.transport(i, TransportEvent::Message(message));
                }
            }
        }
        tracing::warn!("cluster did not settle");
    }

    /// Advance the shared clock and tick every client.
    pub fn tick(&mut self, by: Duration) {
        self.env.advance(by);
        let now = self.env.now();
        for i in 0..self.nodes.len() {
            let events = self.nodes[i].bridge.handle_tick(now);
            self.run_events(i, events);
        }
    }

    /// Drop node `i`'s connection and reconnect it, as the transport would.
    pub fn reconnect(&mut self, i: usize) {
        self.server.disconnect(self.nodes[i].conn);
        self.transport(i, TransportEvent::Disconnected { reason: "connection reset".into() });
        self.nodes[i].conn = self.server.connect();
        self.transport(i, TransportEvent::Connected);
        self.deliver();
    }

    /// Room node `i`'s client believes it is in.
    pub fn room_of(&self, i: usize) -> Option<RoomId> {
        self.nodes[i].bridge.client().state().room().cloned()
    }

    /// Observable state of every client plus the server's rooms.
    pub fn snapshot(&self) -> SystemSnapshot {
        let mut snapshot = SystemSnapshot::empty();
        for node in &self.nodes {
            snapshot.add_client(node.label.clone(), node.bridge.client().snapshot());
        }
        snapshot.with_server(&self.server)
    }

    fn transport(&mut self, i: usize, event: TransportEvent) {
        let events = self.nodes[i].bridge.handle_transport(event);
        self.flush(i);
        self.run_events(i, events);
    }

    fn run_events(&mut self, i: usize, events: Vec<AppEvent>) {
        for event in events {
            let actions = self.nodes[i].app.handle(event);
            self.run_actions(i, actions);
        }
    }

    fn run_actions(&mut self, i: usize, actions: Vec<AppAction>) {
        let mut pending = actions;
        while !pending.is_empty() {
            for action in std::mem::take(&mut pending) {
                match action {
                    AppAction::Render | AppAction::Quit | AppAction::Connect { .. } => {},
                    AppAction::RequestRooms
                    | AppAction::CreateRoom { .. }
                    | AppAction::JoinRoom { .. }
                    | AppAction::LeaveRoom
                    | AppAction::SendEdit { .. } => {
                        let node = &mut self.nodes[i];
                        for event in node.bridge.process_app_action(action) {
                            pending.extend(node.app.handle(event));
                        }
                        self.flush(i);
                    },
                }
            }
        }
    }

    fn flush(&mut self, i: usize) {
        let conn = self.nodes[i].conn;
        for message in self.nodes[i].bridge.take_outgoing() {
            self.server.handle(conn, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvariantRegistry;

    #[test]
    fn cluster_signs_everyone_in() {
        let cluster = TestCluster::new(&["ann", "bob"]);
        let snapshot = cluster.snapshot();

        assert_eq!(snapshot.clients.len(), 2);
        assert!(snapshot.clients.iter().all(|(_, c)| c.connection_id.is_some()));
        InvariantRegistry::quiescent().assert_all(&snapshot, "after sign-in");
    }

    #[test]
    fn typing_reaches_peers() {
        let mut cluster = TestCluster::new(&["ann", "bob"]);
        let room = cluster.open_room(0, "den").unwrap_or_default();
        cluster.join(1, &room);

        cluster.type_text(0, "hello");
        cluster.deliver();

        let bob = &cluster.nodes[1].app;
        let pane = bob.room().and_then(|r| r.panes.iter().find(|p| p.username == "ann"));
        assert_eq!(pane.map(|p| p.text.as_str()), Some("hello"));
        InvariantRegistry::quiescent().assert_all(&cluster.snapshot(), "after typing");
    }
}
