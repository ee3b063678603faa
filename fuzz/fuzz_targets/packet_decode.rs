//! Fuzz target for Packet::decode
//!
//! Feeds arbitrary text frames through the Engine.IO / Socket.IO decoder and
//! on into the typed message layer.
//!
//! # Invariants
//!
//! - NEVER panic on malformed input; invalid frames return an error
//! - A frame that decodes re-encodes without error
//! - Typed messages accept or reject any decoded event packet cleanly

#![no_main]

use libfuzzer_sys::fuzz_target;
use livetype_proto::{ClientMessage, Packet, ServerMessage};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(packet) = Packet::decode(text) else {
        return;
    };

    assert!(packet.encode().is_ok(), "decoded packet failed to re-encode: {packet:?}");

    let _ = ServerMessage::from_packet(packet.clone());
    let _ = ClientMessage::from_packet(packet);
});
