//! Core synchronization logic for livetype.
//!
//! Pure, I/O-free building blocks shared by the client and the simulation
//! harness:
//!
//! - [`diff`]: turns two versions of one author's buffer into a single
//!   [`EditOp`](livetype_proto::EditOp).
//! - [`buffer`]: reconstructs every author's buffer from the edits they send.
//! - [`env`]: time source abstraction so timeouts run on virtual time in
//!   simulation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod buffer;
pub mod diff;
pub mod env;

pub use buffer::{Buffer, BufferStore, apply_edit};
pub use diff::{compute_diff, full_resync};
pub use env::Environment;
