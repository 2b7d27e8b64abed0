//! GPS console built on a command channel.
//!
//! Speaks the shell's `gps` dialect: two set commands per location update,
//! each confirmed by an acknowledgment line on the response stream. All
//! other response traffic (banners, prompts, echoes) is discarded. The
//! interesting lines are matched by substring; they are distinctive enough
//! that anchoring buys nothing.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::timeout;

use crate::console::channel::{CommandChannel, ConsoleError};
use crate::core::cache;
use crate::core::position::Position;

/// Startup line confirming the shell has picked a running device.
pub const DEVICE_SELECTED: &str = "Genymotion virtual device selected";
/// Startup line reporting that nothing is attached.
pub const NO_DEVICE_RUNNING: &str = "No Genymotion virtual device running found";
/// Acknowledgment for `gps setlatitude`.
pub const LATITUDE_ACK: &str = "GPS Latitude set to";
/// Acknowledgment for `gps setlongitude`.
pub const LONGITUDE_ACK: &str = "GPS Longitude set to";

/// The location-control surface of an attached shell.
pub struct GpsConsole {
    channel: Box<dyn CommandChannel>,
    cache_file: PathBuf,
    ack_timeout: Option<Duration>,
}

// The boxed channel has no `Debug`; render the settings only.
impl fmt::Debug for GpsConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpsConsole")
            .field("cache_file", &self.cache_file)
            .field("ack_timeout", &self.ack_timeout)
            .finish_non_exhaustive()
    }
}

impl GpsConsole {
    /// Reads the shell's startup banner until a device is selected.
    ///
    /// If the shell reports no running device instead, the channel is
    /// terminated first and [`ConsoleError::NoDevice`] comes back; the
    /// caller never sees a half-attached console.
    pub async fn attach(
        mut channel: Box<dyn CommandChannel>,
        cache_file: PathBuf,
        ack_timeout: Option<Duration>,
    ) -> Result<Self, ConsoleError> {
        loop {
            let line = read_line(&mut *channel, ack_timeout).await?;
            if line.contains(NO_DEVICE_RUNNING) {
                let _ = channel.terminate().await;
                return Err(ConsoleError::NoDevice);
            }
            if line.contains(DEVICE_SELECTED) {
                debug!("device selected");
                return Ok(Self {
                    channel,
                    cache_file,
                    ack_timeout,
                });
            }
        }
    }

    /// Pushes one location: latitude command, longitude command, then both
    /// acknowledgments in that order. The cache file is rewritten once the
    /// shell has confirmed.
    pub async fn set_location(&mut self, position: Position) -> Result<(), ConsoleError> {
        self.channel
            .send(&format!("gps setlatitude {}", position.latitude()))
            .await?;
        self.channel
            .send(&format!("gps setlongitude {}", position.longitude()))
            .await?;
        self.wait_for(LATITUDE_ACK).await?;
        self.wait_for(LONGITUDE_ACK).await?;
        // The shell already holds the position; a stale cache is only a
        // degraded resume, not a failed push.
        if let Err(e) = cache::store(&self.cache_file, position) {
            warn!("could not update {}: {e}", self.cache_file.display());
        }
        Ok(())
    }

    /// Terminates the underlying channel.
    pub async fn detach(mut self) -> Result<(), ConsoleError> {
        self.channel.terminate().await
    }

    /// Discards response lines until one contains `marker`.
    async fn wait_for(&mut self, marker: &str) -> Result<String, ConsoleError> {
        loop {
            let line = read_line(&mut *self.channel, self.ack_timeout).await?;
            if line.contains(marker) {
                return Ok(line);
            }
            debug!("ignoring shell chatter: {line}");
        }
    }
}

/// One channel read, optionally bounded. `None` waits forever, matching how
/// the shell is normally driven.
async fn read_line(
    channel: &mut dyn CommandChannel,
    window: Option<Duration>,
) -> Result<String, ConsoleError> {
    match window {
        None => channel.next_line().await,
        Some(limit) => match timeout(limit, channel.next_line()).await {
            Ok(result) => result,
            Err(_) => Err(ConsoleError::AckTimeout(limit)),
        },
    }
}
