//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the local input line. Every change to it while in a room becomes an
//!   [`AppAction::SendEdit`]; Enter runs a command or clears the line.
//! - Tracks the lobby catalog and the room view (panes, presence notices).
//! - Tracks high-level connection state and a single status line for UI
//!   feedback.

use livetype_proto::{RoomKind, RoomSummary};

use crate::{
    AppAction, AppEvent, ConnectionState, InputState, KeyInput, RoomView,
    commands::{self, Command},
    input::LineEffect,
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state.
    state: ConnectionState,
    /// Server base URL.
    server: String,
    /// Display name, shown in the prompt.
    username: String,
    /// Location, shown in the prompt.
    location: String,
    /// Last lobby catalog received.
    rooms: Vec<RoomSummary>,
    /// Room the user is in. `None` in the lobby.
    room: Option<RoomView>,
    /// Local input line.
    input: InputState,
    /// Whether the help panel is shown.
    show_help: bool,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Status line.
    status_message: Option<String>,
}

impl App {
    /// Create a new App for the given server and profile.
    pub fn new(server: String, username: String, location: String) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            server,
            username,
            location,
            rooms: Vec::new(),
            room: None,
            input: InputState::new(),
            show_help: true,
            terminal_size: (80, 24),
            status_message: Some("Not connected".into()),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Connecting => {
                self.state = ConnectionState::Connecting;
                self.status_message = Some(format!("Connecting to {}...", self.server));
                vec![AppAction::Render]
            },
            AppEvent::Connected => {
                self.state = ConnectionState::Connected;
                self.status_message = Some(format!("Connected to {}", self.server));
                vec![AppAction::Render]
            },
            AppEvent::Disconnected { reason } => {
                self.state = ConnectionState::Disconnected;
                self.room = None;
                self.status_message = Some(format!("Disconnected from server: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::SignedIn { connection_id, username, location } => {
                self.state = ConnectionState::SignedIn { connection_id };
                self.status_message = Some(format!("Signed in as {username} from {location}"));
                self.username = username;
                self.location = location;
                vec![AppAction::Render]
            },
            AppEvent::SignInFailed => {
                self.status_message = Some("Failed to sign in".into());
                vec![AppAction::Render]
            },
            AppEvent::LobbyUpdated(rooms) => {
                self.rooms = rooms;
                vec![AppAction::Render]
            },
            AppEvent::RoomJoined { room_id, room_name } => {
                self.status_message = Some(format!("Joined room: {room_name} (ID: {room_id})"));
                self.room = Some(RoomView::new(room_id, room_name));
                vec![AppAction::Render]
            },
            AppEvent::RoomLeft { room_id } => {
                if self.room.as_ref().is_some_and(|r| r.room_id == room_id) {
                    self.room = None;
                    self.status_message = Some("Left the room".into());
                }
                vec![AppAction::Render]
            },
            AppEvent::BufferUpdated { user_id, username, text, is_local } => {
                if let Some(room) = self.room.as_mut() {
                    room.upsert(user_id, username, text, is_local);
                }
                vec![AppAction::Render]
            },
            AppEvent::PeerJoined { user_id, username } => {
                if let Some(room) = self.room.as_mut() {
                    room.system_messages.push(format!("{username} joined the room"));
                    if let Some(user_id) = user_id
                        && room.pane(&user_id).is_none()
                    {
                        room.upsert(user_id, username, String::new(), false);
                    }
                }
                vec![AppAction::Render]
            },
            AppEvent::PeerLeft { user_id, username } => {
                if let Some(room) = self.room.as_mut() {
                    let removed = room.remove(&user_id);
                    let name = username
                        .filter(|n| !n.is_empty())
                        .or_else(|| removed.map(|p| p.username))
                        .unwrap_or_else(|| "Unknown User".into());
                    room.system_messages.push(format!("{name} left the room"));
                }
                vec![AppAction::Render]
            },
            AppEvent::Notice { message } => {
                self.status_message = Some(message);
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Initiate connection to the server.
    pub fn connect(&mut self) -> Vec<AppAction> {
        self.state = ConnectionState::Connecting;
        self.status_message = Some(format!("Connecting to {}...", self.server));
        vec![AppAction::Connect { server: self.server.clone() }, AppAction::Render]
    }

    /// Quit the application, leaving the current room first.
    pub fn quit(&self) -> Vec<AppAction> {
        if self.room.is_some() {
            vec![AppAction::LeaveRoom, AppAction::Quit]
        } else {
            vec![AppAction::Quit]
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match self.input.apply(key) {
            LineEffect::Edited => {
                let mut actions = self.line_changed();
                actions.push(AppAction::Render);
                actions
            },
            LineEffect::Moved => vec![AppAction::Render],
            LineEffect::Submitted(line) => self.handle_submit(&line),
            LineEffect::Quit => self.quit(),
            LineEffect::Ignored => vec![],
        }
    }

    fn line_changed(&self) -> Vec<AppAction> {
        if self.room.is_some() {
            vec![AppAction::SendEdit { text: self.input.buffer().to_string() }]
        } else {
            vec![]
        }
    }

    /// Enter: the line was already cleared, so peers see it vanish before any
    /// command takes effect.
    fn handle_submit(&mut self, line: &str) -> Vec<AppAction> {
        let mut actions = if line.is_empty() { vec![] } else { self.line_changed() };

        match commands::parse(line) {
            Ok(Some(command)) => actions.extend(self.run_command(command)),
            Ok(None) => {
                if self.room.is_none() && !line.trim().is_empty() {
                    self.status_message = Some(commands::CommandError::Unknown.to_string());
                }
            },
            Err(e) => self.status_message = Some(e.to_string()),
        }

        if !matches!(actions.last(), Some(AppAction::Quit)) {
            actions.push(AppAction::Render);
        }
        actions
    }

    fn run_command(&mut self, command: Command) -> Vec<AppAction> {
        match command {
            Command::Rooms => vec![AppAction::RequestRooms],
            Command::Join { room_id, access_code } => {
                vec![AppAction::JoinRoom { room_id, access_code }]
            },
            Command::Create { name } => {
                vec![AppAction::CreateRoom { name, kind: RoomKind::Public, access_code: None }]
            },
            Command::CreatePrivate { name, access_code } => vec![AppAction::CreateRoom {
                name,
                kind: RoomKind::SemiPrivate,
                access_code: Some(access_code),
            }],
            Command::Leave => {
                if self.room.is_some() {
                    vec![AppAction::LeaveRoom]
                } else {
                    self.status_message = Some("Not in a room".into());
                    vec![]
                }
            },
            Command::Help => {
                self.show_help = !self.show_help;
                vec![]
            },
            Command::Quit => self.quit(),
        }
    }

    /// Current connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    /// Server base URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Last lobby catalog received.
    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    /// Room the user is in. `None` in the lobby.
    pub fn room(&self) -> Option<&RoomView> {
        self.room.as_ref()
    }

    /// Local input line.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Whether the help panel is shown.
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// Input prompt: `username@location[room]> `, or without the room part
    /// in the lobby.
    pub fn prompt(&self) -> String {
        match &self.room {
            Some(room) => format!("{}@{}[{}]> ", self.username, self.location, room.room_id),
            None => format!("{}@{}> ", self.username, self.location),
        }
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new("http://localhost:3000".into(), "ann".into(), "Oslo".into())
    }

    fn in_room() -> App {
        let mut app = app();
        app.handle(AppEvent::SignedIn {
            connection_id: "me".into(),
            username: "ann".into(),
            location: "Oslo".into(),
        });
        app.handle(AppEvent::RoomJoined { room_id: "7".into(), room_name: "lounge".into() });
        app
    }

    fn type_line(app: &mut App, text: &str) -> Vec<AppAction> {
        text.chars().flat_map(|c| app.handle(AppEvent::Key(KeyInput::Char(c)))).collect()
    }

    fn edits(actions: &[AppAction]) -> Vec<&str> {
        actions
            .iter()
            .filter_map(|a| match a {
                AppAction::SendEdit { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn api_connect() {
        let mut app = app();
        let actions = app.connect();

        assert!(matches!(actions.as_slice(), [AppAction::Connect { .. }, AppAction::Render]));
        assert_eq!(app.state, ConnectionState::Connecting);
    }

    #[test]
    fn typing_in_lobby_sends_nothing() {
        let mut app = app();
        let actions = type_line(&mut app, "hi");

        assert!(edits(&actions).is_empty());
        assert_eq!(app.input().buffer(), "hi");
    }

    #[test]
    fn typing_in_room_streams_every_keystroke() {
        let mut app = in_room();
        let mut actions = type_line(&mut app, "hey");
        actions.extend(app.handle(AppEvent::Key(KeyInput::Backspace)));

        assert_eq!(edits(&actions), ["h", "he", "hey", "he"]);
    }

    #[test]
    fn cursor_moves_do_not_send() {
        let mut app = in_room();
        type_line(&mut app, "ab");

        assert_eq!(app.handle(AppEvent::Key(KeyInput::Left)), vec![AppAction::Render]);
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Tab)), vec![]);
    }

    #[test]
    fn enter_in_room_clears_the_line_for_peers() {
        let mut app = in_room();
        type_line(&mut app, "hello");
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![AppAction::SendEdit { text: String::new() }, AppAction::Render]);
        assert!(app.input().is_empty());
    }

    #[test]
    fn leave_command_clears_then_leaves() {
        let mut app = in_room();
        type_line(&mut app, "leave");
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![
            AppAction::SendEdit { text: String::new() },
            AppAction::LeaveRoom,
            AppAction::Render
        ]);
    }

    #[test]
    fn commands_map_to_actions() {
        let mut app = app();

        type_line(&mut app, "createp night owls 1234");
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Enter)), vec![
            AppAction::CreateRoom {
                name: "night owls".into(),
                kind: RoomKind::SemiPrivate,
                access_code: Some("1234".into()),
            },
            AppAction::Render
        ]);

        type_line(&mut app, "JOIN 42");
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Enter)), vec![
            AppAction::JoinRoom { room_id: "42".into(), access_code: None },
            AppAction::Render
        ]);

        type_line(&mut app, "rooms");
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Enter)), vec![
            AppAction::RequestRooms,
            AppAction::Render
        ]);
    }

    #[test]
    fn bad_command_sets_usage() {
        let mut app = app();
        type_line(&mut app, "join");
        app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(
            app.status_message(),
            Some("Invalid join command. Usage: join <room_id> [access_code]")
        );
    }

    #[test]
    fn plain_text_in_lobby_is_unknown_command() {
        let mut app = app();
        type_line(&mut app, "hello");
        app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(
            app.status_message(),
            Some("Unknown command. Type 'help' for available commands.")
        );
    }

    #[test]
    fn leave_in_lobby_is_refused() {
        let mut app = app();
        type_line(&mut app, "leave");

        assert_eq!(app.handle(AppEvent::Key(KeyInput::Enter)), vec![AppAction::Render]);
        assert_eq!(app.status_message(), Some("Not in a room"));
    }

    #[test]
    fn quit_leaves_room_first() {
        let mut app = in_room();
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Esc)), vec![
            AppAction::LeaveRoom,
            AppAction::Quit
        ]);

        let mut lobby = self::app();
        type_line(&mut lobby, "quit");
        assert_eq!(lobby.handle(AppEvent::Key(KeyInput::Enter)), vec![AppAction::Quit]);
    }

    #[test]
    fn help_toggles_panel() {
        let mut app = app();
        assert!(app.show_help());
        type_line(&mut app, "help");
        app.handle(AppEvent::Key(KeyInput::Enter));
        assert!(!app.show_help());
    }

    #[test]
    fn prompt_shows_room() {
        let mut app = app();
        assert_eq!(app.prompt(), "ann@Oslo> ");

        let app = in_room();
        assert_eq!(app.prompt(), "ann@Oslo[7]> ");
    }

    #[test]
    fn presence_updates_panes_and_notices() {
        let mut app = in_room();
        app.handle(AppEvent::PeerJoined { user_id: Some("b".into()), username: "bob".into() });
        app.handle(AppEvent::BufferUpdated {
            user_id: "b".into(),
            username: "bob".into(),
            text: "hi".into(),
            is_local: false,
        });
        app.handle(AppEvent::PeerLeft { user_id: "b".into(), username: None });

        let room = app.room().expect("in room");
        assert!(room.panes.is_empty());
        assert_eq!(room.system_messages, ["bob joined the room", "bob left the room"]);
    }

    #[test]
    fn unknown_leaver_is_named_unknown_user() {
        let mut app = in_room();
        app.handle(AppEvent::PeerLeft { user_id: "z".into(), username: None });

        let room = app.room().expect("in room");
        assert_eq!(room.system_messages, ["Unknown User left the room"]);
    }

    #[test]
    fn room_switch_resets_view() {
        let mut app = in_room();
        app.handle(AppEvent::PeerJoined { user_id: Some("b".into()), username: "bob".into() });
        app.handle(AppEvent::RoomLeft { room_id: "7".into() });
        app.handle(AppEvent::RoomJoined { room_id: "8".into(), room_name: "den".into() });

        let room = app.room().expect("in room");
        assert_eq!(room.room_id, "8");
        assert!(room.panes.is_empty());
        assert!(room.system_messages.is_empty());
        assert_eq!(app.status_message(), Some("Joined room: den (ID: 8)"));
    }

    #[test]
    fn stale_room_left_is_ignored() {
        let mut app = in_room();
        app.handle(AppEvent::RoomLeft { room_id: "other".into() });
        assert!(app.room().is_some());
    }

    #[test]
    fn disconnect_drops_room() {
        let mut app = in_room();
        app.handle(AppEvent::Disconnected { reason: "closed".into() });

        assert!(app.room().is_none());
        assert_eq!(app.connection_state(), &ConnectionState::Disconnected);
        assert_eq!(app.status_message(), Some("Disconnected from server: closed"));
    }

    #[test]
    fn buffer_updates_outside_room_are_dropped() {
        let mut app = app();
        app.handle(AppEvent::BufferUpdated {
            user_id: "b".into(),
            username: "bob".into(),
            text: "hi".into(),
            is_local: false,
        });
        assert!(app.room().is_none());
    }
}
