//! Property tests for the App and Bridge working together.

use livetype_app::{App, AppAction, AppEvent, Bridge, KeyInput};
use livetype_client::{Profile, TransportEvent};
use livetype_core::env::test_utils::MockEnv;
use livetype_proto::{RoomJoined, ServerMessage, SigninStatus};
use proptest::prelude::*;

fn key() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => prop::sample::select(vec!['a', 'b', ' ', 'é', '字', '😀']).prop_map(KeyInput::Char),
        2 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
    ]
}

fn in_room() -> (App, Bridge<MockEnv>) {
    let mut app = App::new("http://sim".into(), "ann".into(), "Oslo".into());
    let mut bridge = Bridge::new(MockEnv::new(), Profile::new("ann", "Oslo"));

    let mut events = bridge.handle_transport(TransportEvent::Connected);
    events.extend(bridge.handle_transport(TransportEvent::Message(ServerMessage::SigninStatus(
        SigninStatus { is_signed_in: true, user_id: Some("me".into()) },
    ))));
    events.extend(
        bridge.process_app_action(AppAction::JoinRoom { room_id: "1".into(), access_code: None }),
    );
    events.extend(bridge.handle_transport(TransportEvent::Message(ServerMessage::RoomJoined(
        RoomJoined { room_id: "1".into(), room_name: "r".into() },
    ))));
    for event in events {
        let _ = app.handle(event);
    }
    let _ = bridge.take_outgoing();

    (app, bridge)
}

proptest! {
    #[test]
    fn cursor_stays_in_line(keys in prop::collection::vec(key(), 0..64)) {
        let mut app = App::new("http://sim".into(), "ann".into(), "Oslo".into());
        for k in keys {
            let _ = app.handle(AppEvent::Key(k));
            prop_assert!(app.input().cursor() <= app.input().len());
        }
    }

    #[test]
    fn every_edit_carries_the_whole_line(keys in prop::collection::vec(key(), 1..64)) {
        let (mut app, _) = in_room();
        for k in keys {
            let actions = app.handle(AppEvent::Key(k));
            for action in actions {
                if let AppAction::SendEdit { text } = action {
                    prop_assert_eq!(text.as_str(), app.input().buffer());
                }
            }
        }
    }

    #[test]
    fn local_pane_mirrors_input(keys in prop::collection::vec(key(), 1..64)) {
        let (mut app, mut bridge) = in_room();
        for k in keys {
            let mut pending = app.handle(AppEvent::Key(k));
            while !pending.is_empty() {
                let mut next = Vec::new();
                for action in pending {
                    for event in bridge.process_app_action(action) {
                        next.extend(app.handle(event));
                    }
                }
                pending = next;
            }
        }

        let typed = app.input().buffer().to_string();
        let local = app
            .room()
            .and_then(|room| room.panes.iter().find(|p| p.is_local))
            .map(|p| p.text.clone())
            .unwrap_or_default();
        prop_assert_eq!(local, typed.clone());

        let mirrored = bridge.client().buffers().get("me").map(|b| b.text().to_string());
        if !typed.is_empty() {
            prop_assert_eq!(mirrored, Some(typed));
        }
    }
}
