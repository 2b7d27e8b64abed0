//! # Emulator console
//!
//! Everything that talks to the Genymotion shell lives here. The shell is
//! an external process with a line-oriented command interface; this module
//! treats it as an opaque request/response transport plus one protocol
//! speaker on top:
//!
//! - [`channel`]: the raw line channel (a spawned shell process, or a
//!   scripted double in tests)
//! - [`gps`]: turns positions into `gps set*` commands and waits for the
//!   matching acknowledgments

pub mod channel;
pub mod gps;

pub use channel::{CommandChannel, ConsoleError, ShellProcess};
pub use gps::GpsConsole;
