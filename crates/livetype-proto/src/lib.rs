//! Wire protocol for livetype.
//!
//! Typed messages for the real-time chat protocol and the text packet codec
//! that carries them. The transport is Socket.IO v4 over Engine.IO v4
//! WebSocket frames: every message is a named event with a JSON payload.
//!
//! # Layers
//!
//! - [`Packet`]: Engine.IO/Socket.IO text packet (`0{..}`, `2`, `3`, `40`,
//!   `42["event", payload]`, ...). Knows nothing about chat semantics.
//! - [`ClientMessage`] / [`ServerMessage`]: the closed set of events each side
//!   may emit, one variant per event name. Conversion to and from
//!   [`Packet::Event`] is exhaustive.
//! - [`EditOp`]: the delta carried by every `chat update`.
//!
//! # Invariants
//!
//! Each message variant maps to exactly one event name. Decoding an event
//! produced by encoding a message yields the same message.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod edit;
pub mod errors;
mod ids;
pub mod message;
pub mod packet;
pub mod room;

pub use edit::EditOp;
pub use errors::{ProtocolError, Result};
pub use message::{
    ClientMessage, CreateRoom, JoinRoom, RemoteEdit, RoomJoined, ServerMessage, SignIn,
    SigninStatus, UserJoined,
};
pub use packet::{Handshake, Packet};
pub use room::{ROOM_CAPACITY, RoomId, RoomKind, RoomSummary, RoomUser, UserId};
