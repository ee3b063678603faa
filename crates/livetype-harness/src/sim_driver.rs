//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`livetype_app::Runtime`] orchestration code runs in both production and
//! simulation. Input events are scripted; the transport is a connection to a
//! [`SharedSimServer`].

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use livetype_app::{App, AppEvent, Driver, KeyInput};
use livetype_client::{Environment, TransportEvent};
use livetype_proto::ClientMessage;

use crate::{ConnId, SharedSimServer, SimEnv, SimInstant, SimServer};

/// Error type for simulation driver.
#[derive(Debug, Clone, thiserror::Error)]
#[error("SimDriverError: {0}")]
pub struct SimDriverError(pub String);

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    incoming: VecDeque<TransportEvent>,
    sent: Vec<ClientMessage>,
    conn: Option<ConnId>,
    renders: usize,
    last_status: Option<String>,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`livetype_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
/// Clones share state, so a test can keep a handle while the runtime owns
/// the driver.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    server: Option<SharedSimServer>,
    env: SimEnv,
}

impl SimDriver {
    /// Driver with no server; every connect attempt fails.
    pub fn offline(env: SimEnv) -> Self {
        Self { state: Arc::default(), server: None, env }
    }

    /// Driver that connects to `server`.
    pub fn new(server: SharedSimServer, env: SimEnv) -> Self {
        Self { state: Arc::default(), server: Some(server), env }
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject keystrokes for `line` followed by Enter.
    pub fn inject_line(&self, line: &str) {
        let mut state = self.lock();
        state.pending_events.extend(line.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        state.pending_events.push_back(AppEvent::Key(KeyInput::Enter));
    }

    /// Inject keystrokes for `text` without Enter.
    pub fn inject_text(&self, text: &str) {
        self.lock().pending_events.extend(text.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
    }

    /// Drop the connection and reconnect, as the transport does after a
    /// network failure.
    pub fn bounce_connection(&self) {
        let Some(server) = &self.server else {
            return;
        };
        let mut server = lock_server(server);
        let mut state = self.lock();
        if let Some(conn) = state.conn.take() {
            server.disconnect(conn);
            state.incoming.push_back(TransportEvent::Disconnected {
                reason: "connection reset".into(),
            });
        }
        state.conn = Some(server.connect());
        state.incoming.push_back(TransportEvent::Connected);
    }

    /// Messages sent to the server so far.
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.lock().sent.clone()
    }

    /// Server connection, once connected.
    pub fn conn(&self) -> Option<ConnId> {
        self.lock().conn
    }

    /// Number of renders performed.
    pub fn renders(&self) -> usize {
        self.lock().renders
    }

    /// Status line at the last render.
    pub fn last_status(&self) -> Option<String> {
        self.lock().last_status.clone()
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        !self.lock().pending_events.is_empty()
    }

    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap()
    }
}

#[allow(clippy::unwrap_used)]
fn lock_server(server: &SharedSimServer) -> MutexGuard<'_, SimServer> {
    server.lock().unwrap()
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    async fn send_message(&mut self, message: ClientMessage) -> Result<(), Self::Error> {
        let conn = {
            let mut state = self.lock();
            state.sent.push(message.clone());
            state.conn
        };
        let (Some(server), Some(conn)) = (&self.server, conn) else {
            return Err(SimDriverError("not connected".into()));
        };
        lock_server(server).handle(conn, message);
        Ok(())
    }

    async fn recv_transport(&mut self) -> Option<TransportEvent> {
        let mut state = self.lock();
        if let (Some(server), Some(conn)) = (&self.server, state.conn) {
            let delivered = lock_server(server).drain(conn);
            state.incoming.extend(delivered.into_iter().map(TransportEvent::Message));
        }
        state.incoming.pop_front()
    }

    async fn connect(&mut self, server_url: &str) -> Result<(), Self::Error> {
        let Some(server) = &self.server else {
            return Err(SimDriverError(format!("connection refused: {server_url}")));
        };
        let conn = lock_server(server).connect();
        let mut state = self.lock();
        state.conn = Some(conn);
        state.incoming.push_back(TransportEvent::Connected);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().conn.is_some()
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let mut state = self.lock();
        state.renders += 1;
        state.last_status = app.status_message().map(str::to_string);
        Ok(())
    }

    fn stop(&mut self) {
        let conn = self.lock().conn.take();
        if let (Some(server), Some(conn)) = (&self.server, conn) {
            lock_server(server).disconnect(conn);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::create_shared_server;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::offline(SimEnv::new());
        driver.inject_event(AppEvent::Tick);

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn offline_connect_fails() {
        let mut driver = SimDriver::offline(SimEnv::new());
        assert!(driver.connect("sim://nowhere").await.is_err());
        assert!(!driver.is_connected());
    }

    #[tokio::test]
    async fn connect_queues_connected_event() {
        let server = create_shared_server();
        let mut driver = SimDriver::new(server.clone(), SimEnv::new());
        driver.connect("sim://server").await.unwrap();

        assert_eq!(driver.recv_transport().await, Some(TransportEvent::Connected));
        assert_eq!(driver.recv_transport().await, None);
        assert_eq!(server.lock().unwrap().connection_count(), 1);
    }

    #[tokio::test]
    async fn send_reaches_server_and_replies_come_back() {
        let server = create_shared_server();
        let mut driver = SimDriver::new(server, SimEnv::new());
        driver.connect("sim://server").await.unwrap();
        let _ = driver.recv_transport().await;

        driver.send_message(ClientMessage::GetRooms).await.unwrap();

        assert_eq!(
            driver.recv_transport().await,
            Some(TransportEvent::Message(livetype_proto::ServerMessage::LobbyUpdate(vec![])))
        );
        assert_eq!(driver.sent(), vec![ClientMessage::GetRooms]);
    }
}
