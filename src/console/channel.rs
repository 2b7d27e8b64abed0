//! Line-oriented command channel to the emulator shell.
//!
//! [`ShellProcess`] is the real thing: a spawned shell with piped stdin and
//! stdout. The [`CommandChannel`] trait is the seam that lets the GPS
//! console and the sync loop run against a scripted channel in tests.

use std::fmt;
use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Errors from the shell channel and the GPS console built on it.
#[derive(Debug)]
pub enum ConsoleError {
    /// The shell binary could not be started.
    Spawn(io::Error),
    /// A read or write on the channel failed.
    Io(io::Error),
    /// The channel reached end-of-stream: the shell exited or closed its
    /// output.
    Closed,
    /// The shell reported that no virtual device is running.
    NoDevice,
    /// No response line arrived within the configured window.
    AckTimeout(Duration),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Spawn(e) => write!(f, "failed to launch the shell: {e}"),
            ConsoleError::Io(e) => write!(f, "shell channel I/O error: {e}"),
            ConsoleError::Closed => write!(f, "shell channel closed unexpectedly"),
            ConsoleError::NoDevice => {
                write!(f, "no Genymotion virtual device is running")
            }
            ConsoleError::AckTimeout(window) => {
                write!(f, "no response from the shell within {}ms", window.as_millis())
            }
        }
    }
}

impl std::error::Error for ConsoleError {}

/// A line-oriented request/response transport.
#[async_trait]
pub trait CommandChannel: Send {
    /// Writes one command line; the newline is appended here.
    async fn send(&mut self, line: &str) -> Result<(), ConsoleError>;

    /// Reads the next response line, or [`ConsoleError::Closed`] at
    /// end-of-stream. Never hands back an empty read in a loop.
    async fn next_line(&mut self) -> Result<String, ConsoleError>;

    /// Tears the transport down. Tolerates a peer that is already gone.
    async fn terminate(&mut self) -> Result<(), ConsoleError>;
}

/// A spawned emulator shell with piped stdin/stdout.
pub struct ShellProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl ShellProcess {
    /// Launches the shell binary. Stdout is consumed line by line; stderr is
    /// left attached to the terminal, as the shell's own tool would have it.
    pub fn launch(path: &str) -> Result<Self, ConsoleError> {
        info!("launching shell: {path}");
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            // If we unwind without a clean shutdown, the shell goes too.
            .kill_on_drop(true)
            .spawn()
            .map_err(ConsoleError::Spawn)?;
        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");
        Ok(Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        })
    }
}

#[async_trait]
impl CommandChannel for ShellProcess {
    async fn send(&mut self, line: &str) -> Result<(), ConsoleError> {
        debug!("shell <- {line}");
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(ConsoleError::Io)?;
        self.stdin.write_all(b"\n").await.map_err(ConsoleError::Io)?;
        self.stdin.flush().await.map_err(ConsoleError::Io)
    }

    async fn next_line(&mut self) -> Result<String, ConsoleError> {
        match self.lines.next_line().await.map_err(ConsoleError::Io)? {
            Some(line) => {
                debug!("shell -> {line}");
                Ok(line)
            }
            None => Err(ConsoleError::Closed),
        }
    }

    async fn terminate(&mut self) -> Result<(), ConsoleError> {
        info!("terminating shell process");
        match self.child.start_kill() {
            Ok(()) => {}
            // InvalidInput: already exited, nothing left to kill.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(ConsoleError::Io(e)),
        }
        let _ = self.child.wait().await;
        Ok(())
    }
}
