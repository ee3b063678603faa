//! Terminal UI for livetype
//!
//! A thin shell over [`livetype_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`livetype_app::Runtime`]
//!
//! This crate only handles terminal rendering, keyboard input and the
//! production clock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod system_env;
pub mod terminal;
pub mod ui;

pub use livetype_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
