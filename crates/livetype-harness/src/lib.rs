//! Deterministic simulation harness for livetype protocol testing.
//!
//! In-memory implementations of the server, environment and driver for
//! deterministic, reproducible testing of the full client stack.
//!
//! # Components
//!
//! - [`SimServer`]: In-memory chat server with rooms, access codes and relay
//! - [`SimEnv`]: Manually advanced clock
//! - [`SimDriver`]: [`livetype_app::Driver`] wired to a shared [`SimServer`]
//! - [`TestCluster`]: Several App/Bridge pairs against one server, driven
//!   synchronously
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_server;

pub use cluster::TestCluster;
pub use invariants::{
    BuffersRequireRoom, Invariant, InvariantRegistry, InvariantResult, PeerConvergence,
    RoomSnapshot, SessionRequiresIdentity, SystemSnapshot, UniqueBufferOwners, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_server::{ConnId, SharedSimServer, SimServer, create_shared_server};
