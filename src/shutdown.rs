//! Process-wide shutdown coordination.
//!
//! One [`Shutdown`] handle is shared by everything that can end the run:
//! the quit chord in the input loop, OS signals, and a failed shell push.
//! The first `request()` wins; later calls are no-ops.

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

#[derive(Clone)]
pub struct Shutdown {
    flag: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { flag: Arc::new(tx) }
    }

    /// Marks the process as shutting down and wakes every waiter.
    pub fn request(&self) {
        if !self.flag.send_replace(true) {
            info!("shutdown requested");
        }
    }

    pub fn is_requested(&self) -> bool {
        *self.flag.borrow()
    }

    /// Completes once shutdown has been requested, immediately if it
    /// already was.
    pub async fn requested(&self) {
        let mut rx = self.flag.subscribe();
        // Cannot fail: `self` keeps the sender alive for the whole wait.
        let _ = rx.wait_for(|stop| *stop).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes terminating signals to the coordinator. Registration happens
/// here, synchronously, so a failure is the caller's to handle; the watch
/// itself runs on a background task.
pub fn listen_for_signals(shutdown: Shutdown) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = interrupt.recv() => info!("caught SIGINT"),
                _ = terminate.recv() => info!("caught SIGTERM"),
            }
            shutdown.request();
        });
    }
    #[cfg(not(unix))]
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("caught interrupt");
            shutdown.request();
        }
    });
    Ok(())
}
