//! # Lifecycle controller
//!
//! Owns startup and shutdown ordering. Startup is strictly sequential:
//! wire up signal handling, resolve the starting position, attach the
//! shell, push that position once, start the sync loop, and only then hand
//! the terminal to the keyboard loop. Shutdown reverses it: raise the stop
//! flag, let the input loop drain, join the sync task, terminate the shell.

use std::fmt;
use std::io;

use log::{info, warn};

use crate::console::channel::{ConsoleError, ShellProcess};
use crate::console::gps::GpsConsole;
use crate::core::config::ResolvedConfig;
use crate::core::sync::Synchronizer;
use crate::core::walker::SharedWalker;
use crate::input::{self, Steps};
use crate::locate::{self, LocateError, Startpoint};
use crate::shutdown::{self, Shutdown};

/// Anything fatal enough to end the run with a non-zero status.
#[derive(Debug)]
pub enum AppError {
    Locate(LocateError),
    Console(ConsoleError),
    Terminal(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Locate(e) => write!(f, "{e}"),
            AppError::Console(e) => write!(f, "{e}"),
            AppError::Terminal(e) => write!(f, "terminal error: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<LocateError> for AppError {
    fn from(e: LocateError) -> Self {
        AppError::Locate(e)
    }
}

impl From<ConsoleError> for AppError {
    fn from(e: ConsoleError) -> Self {
        AppError::Console(e)
    }
}

/// Runs a walk from startup to clean exit.
pub async fn run(config: ResolvedConfig, start: Startpoint) -> Result<(), AppError> {
    // Handlers are in place before anything that can block for long (the
    // lookup, the device handshake), so a signal arriving while we wait
    // already lands on the coordinator.
    let shutdown = Shutdown::new();
    if let Err(e) = shutdown::listen_for_signals(shutdown.clone()) {
        warn!("running without signal handlers: {e}");
    }

    let initial = locate::resolve(start, &config.cache_file, &config.lookup_url).await?;
    info!("initial position {initial}");
    println!("starting at {initial}");

    println!("launching the shell, waiting for a device...");
    let channel = ShellProcess::launch(&config.shell_path)?;
    let mut console =
        GpsConsole::attach(Box::new(channel), config.cache_file.clone(), config.ack_timeout)
            .await?;
    println!("device selected");

    // The device learns the starting point before any key is handled.
    console.set_location(initial).await?;

    let walker = SharedWalker::new(initial, config.initial_heading);
    let sync = Synchronizer::new(walker.clone(), console, initial, config.update_interval);
    let sync_task = tokio::spawn(sync.run(shutdown.clone()));

    println!("ready: arrows or WASD walk and turn, ',' and '.' snap 90, Esc Esc quits");
    let steps = Steps {
        movement: config.move_step,
        rotation: config.rotate_step,
    };
    let input_result = input::run(walker, shutdown.clone(), steps);

    // The keyboard loop is done, one way or another; stop the sync loop
    // and join it before touching the channel.
    shutdown.request();
    let sync_outcome = sync_task.await.expect("sync loop task panicked");

    if let Err(e) = &input_result {
        warn!("keyboard loop ended with an error: {e}");
    }

    match sync_outcome {
        Ok(console) => {
            if let Err(e) = console.detach().await {
                warn!("shell did not shut down cleanly: {e}");
            }
        }
        // The loop already terminated the channel before surfacing this.
        Err(e) => return Err(AppError::Console(e)),
    }

    input_result.map_err(AppError::Terminal)?;
    info!("clean exit");
    println!("bye");
    Ok(())
}
