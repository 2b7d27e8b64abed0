//! # Keyboard loop
//!
//! The foreground half of the program: raw-mode terminal input decoded into
//! walker commands. The loop owns the terminal for its lifetime and
//! restores it on the way out, including when an error unwinds.
//!
//! Every decoded command mutates the walker directly; the sync loop picks
//! the result up on its next tick. The quit chord breaks the loop, and each
//! poll times out quickly so a shutdown requested elsewhere (a signal, a
//! failed push) is noticed between keystrokes.

pub mod keys;

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal;
use log::{debug, info};

use crate::core::walker::SharedWalker;
use crate::input::keys::{Command, KeyDecoder};
use crate::shutdown::Shutdown;

/// How long one poll waits before re-checking the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Step sizes applied per keypress.
#[derive(Debug, Clone, Copy)]
pub struct Steps {
    /// Degrees of arc walked per forward/backward press.
    pub movement: f64,
    /// Degrees turned per left/right press.
    pub rotation: i32,
}

/// Puts the terminal in raw mode and guarantees it is restored on drop.
struct RawModeGuard;

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Runs the keyboard loop until the quit chord or a shutdown request.
/// Blocks the calling thread; the sync loop runs elsewhere meanwhile.
pub fn run(walker: SharedWalker, shutdown: Shutdown, steps: Steps) -> io::Result<()> {
    let _raw = RawModeGuard::new()?;
    let mut decoder = KeyDecoder::default();

    while !shutdown.is_requested() {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let Some(command) = decoder.decode(key) else {
            continue;
        };
        match command {
            Command::Forward => {
                let position = walker.step(steps.movement);
                debug!("stepped forward to {position}");
                say(&format!("position: {position}"));
            }
            Command::Backward => {
                let position = walker.step(-steps.movement);
                debug!("stepped back to {position}");
                say(&format!("position: {position}"));
            }
            Command::TurnLeft => say(&heading_line(walker.turn(steps.rotation))),
            Command::TurnRight => say(&heading_line(walker.turn(-steps.rotation))),
            Command::SnapLeft => say(&heading_line(walker.turn(90))),
            Command::SnapRight => say(&heading_line(walker.turn(-90))),
            Command::Quit => {
                info!("quit requested from the keyboard");
                shutdown.request();
                break;
            }
            Command::Other => {}
        }
    }
    Ok(())
}

fn heading_line(heading: i32) -> String {
    format!("heading: {heading}")
}

/// Raw mode needs an explicit carriage return on every line.
fn say(line: &str) {
    print!("{line}\r\n");
    let _ = io::stdout().flush();
}
