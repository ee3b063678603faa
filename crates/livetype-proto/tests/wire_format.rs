//! Wire format snapshots.
//!
//! Pins the exact text each outbound event produces, since every other
//! client in a room must be able to read it. JSON object keys are emitted in
//! sorted order.

use livetype_proto::{
    ClientMessage, CreateRoom, EditOp, JoinRoom, Packet, RoomKind, ServerMessage, SignIn,
};

fn encode(message: ClientMessage) -> String {
    message.into_packet().and_then(|packet| packet.encode()).expect("encode message")
}

#[test]
fn sign_in() {
    let text = encode(ClientMessage::JoinLobby(SignIn {
        username: "ann".into(),
        location: "On The Web".into(),
    }));
    insta::assert_snapshot!(text, @r#"42["join lobby",{"location":"On The Web","username":"ann"}]"#);
}

#[test]
fn get_rooms_and_leave() {
    insta::assert_snapshot!(encode(ClientMessage::GetRooms), @r#"42["get rooms"]"#);
    insta::assert_snapshot!(encode(ClientMessage::LeaveRoom), @r#"42["leave room"]"#);
}

#[test]
fn create_semi_private_room() {
    let text = encode(ClientMessage::CreateRoom(CreateRoom::new(
        "late night",
        RoomKind::SemiPrivate,
        "default",
        Some("abcd".into()),
    )));
    insta::assert_snapshot!(text, @r#"42["create room",{"accessCode":"abcd","layout":"default","name":"late night","type":"semi-private"}]"#);
}

#[test]
fn create_public_room_omits_code() {
    let text =
        encode(ClientMessage::CreateRoom(CreateRoom::new("lobby", RoomKind::Public, "default", None)));
    insta::assert_snapshot!(text, @r#"42["create room",{"layout":"default","name":"lobby","type":"public"}]"#);
}

#[test]
fn join_with_code() {
    let text = encode(ClientMessage::JoinRoom(JoinRoom::new("42", Some("abcd".into()))));
    insta::assert_snapshot!(text, @r#"42["join room",{"accessCode":"abcd","roomId":"42"}]"#);
}

#[test]
fn chat_update_ops() {
    let add = encode(ClientMessage::ChatUpdate {
        diff: EditOp::Add { index: 5, text: " world".into() },
    });
    insta::assert_snapshot!(add, @r#"42["chat update",{"diff":{"index":5,"text":" world","type":"add"}}]"#);

    let delete = encode(ClientMessage::ChatUpdate { diff: EditOp::Delete { index: 5, count: 6 } });
    insta::assert_snapshot!(delete, @r#"42["chat update",{"diff":{"count":6,"index":5,"type":"delete"}}]"#);

    let full = encode(ClientMessage::ChatUpdate { diff: EditOp::FullReplace { text: "hi".into() } });
    insta::assert_snapshot!(full, @r#"42["chat update",{"diff":{"text":"hi","type":"full-replace"}}]"#);
}

#[test]
fn server_lobby_update_decodes() {
    let text = r#"42["lobby update",[{"id":"1","name":"a","type":"public","layout":"default","users":[]},{"id":2,"name":"b","type":"semi-private","layout":"default","users":[{"id":"x","username":"ann","location":"Oslo"}]}]]"#;

    let packet = Packet::decode(text).expect("packet");
    let ServerMessage::LobbyUpdate(rooms) = ServerMessage::from_packet(packet).expect("message")
    else {
        panic!("expected lobby update");
    };

    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[1].id, "2");
    assert_eq!(rooms[1].kind, RoomKind::SemiPrivate);
    assert_eq!(rooms[1].users[0].username, "ann");
}
