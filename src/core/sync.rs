//! Background reconciliation between the walker and the shell.
//!
//! The sync loop wakes on a fixed cadence, snapshots the walker, and pushes
//! only when the position differs from the last one it sent. Equality is
//! exact, so an idle walker costs no shell traffic at all, and a burst of
//! keystrokes between ticks collapses into a single push of wherever the
//! walker ended up.

use std::time::Duration;

use log::{debug, warn};

use crate::console::channel::ConsoleError;
use crate::console::gps::GpsConsole;
use crate::core::position::Position;
use crate::core::walker::SharedWalker;
use crate::shutdown::Shutdown;

pub struct Synchronizer {
    walker: SharedWalker,
    console: GpsConsole,
    /// Last position the shell confirmed. Owned by the loop alone; nobody
    /// else reads or writes it.
    cursor: Position,
    interval: Duration,
}

impl Synchronizer {
    /// `pushed` is the position the shell already holds (the initial push
    /// happens before the loop starts), so an untouched walker stays quiet.
    pub fn new(
        walker: SharedWalker,
        console: GpsConsole,
        pushed: Position,
        interval: Duration,
    ) -> Self {
        Self {
            walker,
            console,
            cursor: pushed,
            interval,
        }
    }

    /// One reconciliation step. Reports whether a push went out.
    pub async fn poll_once(&mut self) -> Result<bool, ConsoleError> {
        let current = self.walker.position();
        if current == self.cursor {
            return Ok(false);
        }
        self.console.set_location(current).await?;
        self.cursor = current;
        debug!("pushed {current}");
        Ok(true)
    }

    /// Runs until shutdown is requested, then hands the console back for
    /// teardown. A channel failure requests shutdown itself (unblocking the
    /// input loop at its next poll tick), terminates the channel, and
    /// surfaces the error.
    pub async fn run(mut self, shutdown: Shutdown) -> Result<GpsConsole, ConsoleError> {
        let failure = loop {
            tokio::select! {
                _ = shutdown.requested() => break None,
                _ = tokio::time::sleep(self.interval) => {}
            }
            // Re-checked at the top of every iteration: once the flag is
            // observed set, no further push goes out.
            if shutdown.is_requested() {
                break None;
            }
            if let Err(e) = self.poll_once().await {
                warn!("location push failed: {e}");
                shutdown.request();
                break Some(e);
            }
        };
        match failure {
            None => Ok(self.console),
            Some(e) => {
                let _ = self.console.detach().await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedChannel;
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};
    use tempfile::{TempDir, tempdir};

    async fn attached_console(channel: ScriptedChannel, dir: &TempDir) -> GpsConsole {
        GpsConsole::attach(Box::new(channel), dir.path().join("cache.txt"), None)
            .await
            .expect("attach should succeed")
    }

    fn synchronizer_over(
        console: GpsConsole,
        walker: &SharedWalker,
        interval_ms: u64,
    ) -> Synchronizer {
        Synchronizer::new(
            walker.clone(),
            console,
            Position::new(0.0, 0.0),
            Duration::from_millis(interval_ms),
        )
    }

    fn sent(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_poll_without_movement_pushes_nothing() {
        let channel = ScriptedChannel::with_device_selected().auto_ack();
        let log = channel.sent_log();
        let dir = tempdir().unwrap();
        let walker = SharedWalker::new(Position::new(0.0, 0.0), 90);
        let mut sync = synchronizer_over(attached_console(channel, &dir).await, &walker, 100);

        assert!(!sync.poll_once().await.unwrap());
        assert!(!sync.poll_once().await.unwrap());
        assert!(sent(&log).is_empty());
    }

    #[tokio::test]
    async fn test_poll_pushes_once_per_distinct_position() {
        let channel = ScriptedChannel::with_device_selected().auto_ack();
        let log = channel.sent_log();
        let dir = tempdir().unwrap();
        let walker = SharedWalker::new(Position::new(0.0, 0.0), 90);
        let mut sync = synchronizer_over(attached_console(channel, &dir).await, &walker, 100);

        walker.step(0.000015);
        assert!(sync.poll_once().await.unwrap());
        // Idempotent: nothing new to say until the walker moves again.
        assert!(!sync.poll_once().await.unwrap());
        assert_eq!(sent(&log).len(), 2);
    }

    #[tokio::test]
    async fn test_rapid_steps_collapse_into_one_push_of_the_final_position() {
        let channel = ScriptedChannel::with_device_selected().auto_ack();
        let log = channel.sent_log();
        let dir = tempdir().unwrap();
        let walker = SharedWalker::new(Position::new(0.0, 0.0), 90);
        let mut sync = synchronizer_over(attached_console(channel, &dir).await, &walker, 100);

        walker.step(0.000015);
        walker.step(0.000015);
        assert!(sync.poll_once().await.unwrap());

        let commands = sent(&log);
        assert_eq!(commands.len(), 2);
        let expected = walker.position();
        assert_eq!(commands[0], format!("gps setlatitude {}", expected.latitude()));
        assert_eq!(commands[1], format!("gps setlongitude {}", expected.longitude()));
    }

    #[tokio::test]
    async fn test_run_stops_promptly_once_shutdown_is_requested() {
        let channel = ScriptedChannel::with_device_selected().auto_ack();
        let log = channel.sent_log();
        let dir = tempdir().unwrap();
        let walker = SharedWalker::new(Position::new(0.0, 0.0), 90);
        let sync = synchronizer_over(attached_console(channel, &dir).await, &walker, 100);

        // Movement is pending, but the flag is already up: no push may
        // follow it.
        walker.step(0.000015);
        let shutdown = Shutdown::new();
        shutdown.request();

        let console = sync.run(shutdown).await.expect("clean stop");
        assert!(sent(&log).is_empty());
        console.detach().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_pushes_movement_then_returns_console_on_shutdown() {
        let channel = ScriptedChannel::with_device_selected().auto_ack();
        let log = channel.sent_log();
        let terminations = channel.termination_count();
        let dir = tempdir().unwrap();
        let walker = SharedWalker::new(Position::new(0.0, 0.0), 90);
        let sync = synchronizer_over(attached_console(channel, &dir).await, &walker, 5);

        let shutdown = Shutdown::new();
        let task = tokio::spawn(sync.run(shutdown.clone()));

        walker.step(0.000015);
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.request();

        let console = task
            .await
            .expect("task should not panic")
            .expect("clean stop");
        assert_eq!(sent(&log).len(), 2);
        console.detach().await.unwrap();
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_channel_failure_requests_shutdown_and_terminates() {
        // Handshake only: the first push meets end-of-stream.
        let channel = ScriptedChannel::with_device_selected();
        let terminations = channel.termination_count();
        let dir = tempdir().unwrap();
        let walker = SharedWalker::new(Position::new(0.0, 0.0), 90);
        let sync = synchronizer_over(attached_console(channel, &dir).await, &walker, 1);

        walker.step(0.000015);
        let shutdown = Shutdown::new();
        let err = sync.run(shutdown.clone()).await.unwrap_err();

        assert!(matches!(err, ConsoleError::Closed));
        assert!(shutdown.is_requested());
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
    }
}
