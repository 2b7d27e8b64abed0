//! Last-pushed position cache.
//!
//! A single line of text, `"<latitude> <longitude>"`, overwritten after
//! every successful shell push so `-r` can resume the walk later. Writes go
//! to a `.tmp` sibling first and land via rename; a crash mid-write cannot
//! tear the file.

use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use crate::core::position::Position;

/// Reads the cached position. `InvalidData` means the file exists but does
/// not hold two decimal numbers; `NotFound` means no run has written it yet.
pub fn load(path: &Path) -> io::Result<Position> {
    let text = fs::read_to_string(path)?;
    parse(&text).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed cache file {}: {text:?}", path.display()),
        )
    })
}

/// Overwrites the cache with `position`.
pub fn store(path: &Path, position: Position) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, position.to_string())?;
    fs::rename(&tmp, path)?;
    debug!("cached {position} at {}", path.display());
    Ok(())
}

fn parse(text: &str) -> Option<Position> {
    let mut fields = text.split_whitespace();
    let latitude = fields.next()?.parse().ok()?;
    let longitude = fields.next()?.parse().ok()?;
    Some(Position::new(latitude, longitude))
}
