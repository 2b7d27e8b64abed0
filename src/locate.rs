//! Initial position resolution.
//!
//! Three sources, picked on the command line: an explicit pair, the cache
//! file from a previous run, or an IP geolocation lookup for "start where
//! this machine is". Whichever source wins, the result passes through the
//! clamping constructor.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::core::cache;
use crate::core::position::Position;

/// Where the walk begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Startpoint {
    /// `-p <lat> <lon>` on the command line.
    Explicit { latitude: f64, longitude: f64 },
    /// `-r`: the last position a previous run pushed.
    Resume,
    /// No flags: ask a geolocation service about our public IP.
    Lookup,
}

#[derive(Debug)]
pub enum LocateError {
    /// `-r` was passed but no cache file exists yet.
    CacheMissing(PathBuf),
    /// The cache file exists but could not be used.
    CacheUnreadable(io::Error),
    /// The geolocation request failed: network, HTTP status, or body.
    Lookup(reqwest::Error),
}

impl fmt::Display for LocateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateError::CacheMissing(path) => write!(
                f,
                "cannot find cache file \"{}\"; run once without -r first",
                path.display()
            ),
            LocateError::CacheUnreadable(e) => write!(f, "cannot read cache file: {e}"),
            LocateError::Lookup(e) => write!(f, "geolocation lookup failed: {e}"),
        }
    }
}

impl std::error::Error for LocateError {}

/// What the geolocation service answers; extra fields are ignored.
#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    latitude: f64,
    longitude: f64,
}

/// Resolves the starting position from the chosen source.
pub async fn resolve(
    start: Startpoint,
    cache_file: &Path,
    lookup_url: &str,
) -> Result<Position, LocateError> {
    match start {
        Startpoint::Explicit {
            latitude,
            longitude,
        } => Ok(Position::new(latitude, longitude)),
        Startpoint::Resume => match cache::load(cache_file) {
            Ok(position) => {
                info!("resuming from cached position {position}");
                Ok(position)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(LocateError::CacheMissing(cache_file.to_path_buf()))
            }
            Err(e) => Err(LocateError::CacheUnreadable(e)),
        },
        Startpoint::Lookup => {
            info!("no position given, looking one up for this machine's IP");
            let response = reqwest::get(lookup_url)
                .await
                .and_then(|r| r.error_for_status())
                .map_err(LocateError::Lookup)?;
            let geo: GeoIpResponse = response.json().await.map_err(LocateError::Lookup)?;
            info!("lookup answered {} {}", geo.latitude, geo.longitude);
            Ok(Position::new(geo.latitude, geo.longitude))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // The lookup path is covered by the wiremock integration tests.

    #[tokio::test]
    async fn test_explicit_pair_is_clamped() {
        let position = resolve(
            Startpoint::Explicit {
                latitude: 95.0,
                longitude: -200.0,
            },
            Path::new("unused"),
            "http://unused.invalid/",
        )
        .await
        .unwrap();
        assert_eq!(position, Position::new(89.9, -179.9));
    }

    #[tokio::test]
    async fn test_resume_reads_the_cache() {
        let dir = tempdir().unwrap();
        let cache_file = dir.path().join("cache.txt");
        cache::store(&cache_file, Position::new(52.52, 13.405)).unwrap();

        let position = resolve(Startpoint::Resume, &cache_file, "http://unused.invalid/")
            .await
            .unwrap();
        assert_eq!(position, Position::new(52.52, 13.405));
    }

    #[tokio::test]
    async fn test_resume_without_cache_is_missing() {
        let dir = tempdir().unwrap();
        let cache_file = dir.path().join("cache.txt");

        let err = resolve(Startpoint::Resume, &cache_file, "http://unused.invalid/")
            .await
            .unwrap_err();
        assert!(matches!(err, LocateError::CacheMissing(p) if p == cache_file));
    }

    #[tokio::test]
    async fn test_resume_with_garbage_cache_is_unreadable() {
        let dir = tempdir().unwrap();
        let cache_file = dir.path().join("cache.txt");
        fs::write(&cache_file, "somewhere nice").unwrap();

        let err = resolve(Startpoint::Resume, &cache_file, "http://unused.invalid/")
            .await
            .unwrap_err();
        assert!(matches!(err, LocateError::CacheUnreadable(_)));
    }
}
