//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to Client
//! - [`Driver`]: Platform-specific I/O
//!
//! Terminal input, transport notifications and ticks are all consumed by this
//! one loop, so the client state machine never sees concurrent events.

use std::time::Duration;

use livetype_client::{Environment, Profile};

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// How long a failed initial connection stays on screen before exit.
pub const CONNECT_GRACE: Duration = Duration::from_secs(3);

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    env: E,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E, profile: Profile, server: String) -> Self {
        let app = App::new(server, profile.username.clone(), profile.location.clone());
        let bridge = Bridge::new(env.clone(), profile);
        Self { driver, env, app, bridge }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Polls for input events from the driver
    /// 2. Drains transport notifications
    /// 3. Processes actions and events between App and Bridge
    /// 4. Sends outgoing messages through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the initial connection fails or the driver
    /// encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        let actions = self.app.connect();
        if let Err(e) = self.process_actions(actions).await {
            tracing::error!(error = %e, "initial connection failed");
            self.app.set_status(format!("Error connecting to the server: {e}"));
            self.driver.render(&self.app)?;
            self.env.sleep(CONNECT_GRACE).await;
            self.driver.stop();
            return Err(e);
        }

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        while let Some(event) = self.driver.recv_transport().await {
            let events = self.bridge.handle_transport(event);
            self.send_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        self.process_bridge_events(events).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => {
                        self.send_outgoing().await?;
                        return Ok(true);
                    },
                    AppAction::Connect { server } => {
                        self.driver.connect(&server).await?;
                        tracing::info!(%server, "connected");
                        pending_actions.extend(self.app.handle(AppEvent::Connecting));
                    },

                    // Protocol operations go through the bridge
                    AppAction::RequestRooms
                    | AppAction::CreateRoom { .. }
                    | AppAction::JoinRoom { .. }
                    | AppAction::LeaveRoom
                    | AppAction::SendEdit { .. } => {
                        let events = self.bridge.process_app_action(action);
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                        self.send_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Send all pending outgoing messages to the server.
    async fn send_outgoing(&mut self) -> Result<(), D::Error> {
        let messages = self.bridge.take_outgoing();
        for message in messages {
            self.driver.send_message(message).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
