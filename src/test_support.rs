//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::console::channel::{CommandChannel, ConsoleError};
use crate::console::gps::{DEVICE_SELECTED, LATITUDE_ACK, LONGITUDE_ACK};

/// A scripted stand-in for the emulator shell.
///
/// Reads come from a queue of canned lines; an exhausted queue reads as
/// end-of-stream, or pends forever in stall mode (for timeout tests). Every
/// sent command is recorded, and auto-ack mode answers `gps set*` commands
/// with the matching acknowledgment line.
pub struct ScriptedChannel {
    replies: VecDeque<String>,
    auto_ack: bool,
    stall_when_empty: bool,
    sent: Arc<Mutex<Vec<String>>>,
    terminations: Arc<AtomicUsize>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self {
            replies: VecDeque::new(),
            auto_ack: false,
            stall_when_empty: false,
            sent: Arc::new(Mutex::new(Vec::new())),
            terminations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Starts the script with the banner a healthy shell prints.
    pub fn with_device_selected() -> Self {
        let mut channel = Self::new();
        channel.push_line(DEVICE_SELECTED);
        channel
    }

    /// Appends one canned response line.
    pub fn push_line(&mut self, line: &str) {
        self.replies.push_back(line.to_string());
    }

    /// Answer every `gps set*` command with its acknowledgment.
    pub fn auto_ack(mut self) -> Self {
        self.auto_ack = true;
        self
    }

    /// Never reach end-of-stream; pend instead once the script runs dry.
    pub fn stall_when_empty(mut self) -> Self {
        self.stall_when_empty = true;
        self
    }

    /// Handle to the record of sent command lines. Grab it before boxing
    /// the channel away.
    pub fn sent_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }

    /// Handle to the terminate-call counter.
    pub fn termination_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.terminations)
    }
}

impl Default for ScriptedChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandChannel for ScriptedChannel {
    async fn send(&mut self, line: &str) -> Result<(), ConsoleError> {
        self.sent
            .lock()
            .expect("sent log lock poisoned")
            .push(line.to_string());
        if self.auto_ack {
            if let Some(value) = line.strip_prefix("gps setlatitude ") {
                self.replies.push_back(format!("{LATITUDE_ACK} {value}"));
            } else if let Some(value) = line.strip_prefix("gps setlongitude ") {
                self.replies.push_back(format!("{LONGITUDE_ACK} {value}"));
            }
        }
        Ok(())
    }

    async fn next_line(&mut self) -> Result<String, ConsoleError> {
        match self.replies.pop_front() {
            Some(line) => Ok(line),
            None if self.stall_when_empty => std::future::pending().await,
            None => Err(ConsoleError::Closed),
        }
    }

    async fn terminate(&mut self) -> Result<(), ConsoleError> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
