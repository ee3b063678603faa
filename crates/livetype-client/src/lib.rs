//! Client
//!
//! Action-based client state machine for the livetype chat protocol. Tracks
//! sign-in, the lobby catalog and room membership, and keeps every room
//! participant's buffer in sync with the edits they broadcast.
//!
//! # Architecture
//!
//! The client follows the Sans-IO pattern. It receives events
//! ([`ClientEvent`]), processes them through pure state machine logic, and
//! returns actions ([`ClientAction`]) for the caller to execute. It never
//! touches the network or the clock itself.
//!
//! # Components
//!
//! - [`Client`]: Top-level state machine; the only producer of wire messages
//! - [`Session`]: Identity, membership and pending room requests
//! - [`ClientEvent`]: Events fed into the client
//! - [`ClientAction`]: Actions produced by the client
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: Socket.IO connection over a WebSocket
//! - [`transport::connect`]: Connect to a server

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::{Client, ROOM_ACTION_TIMEOUT};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, ClientSnapshot, TransportEvent};
pub use livetype_core::{BufferStore, env::Environment};
pub use livetype_proto::{RoomId, RoomKind, RoomSummary, UserId};
pub use session::{Identity, Profile, Session, SessionState};
