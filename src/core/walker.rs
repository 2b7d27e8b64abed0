//! The movement model: a point with a heading, driven by key commands.
//!
//! [`Walker`] is plain state plus the step and turn rules. [`SharedWalker`]
//! wraps it for concurrent use: the input loop mutates while the sync loop
//! snapshots, and a single mutex keeps a latitude/longitude read from ever
//! seeing a half-applied step.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::position::Position;

/// Current location and direction of travel.
#[derive(Debug)]
pub struct Walker {
    position: Position,
    heading: i32,
}

impl Walker {
    pub fn new(start: Position, heading: i32) -> Self {
        Self {
            position: start,
            heading: heading.rem_euclid(360),
        }
    }

    /// Moves `distance` degrees of arc along the current heading. The
    /// heading follows the mathematical convention: 0 walks east, 90 north.
    pub fn step(&mut self, distance: f64) {
        let radians = f64::from(self.heading).to_radians();
        self.position = Position::new(
            self.position.latitude() + distance * radians.sin(),
            self.position.longitude() + distance * radians.cos(),
        );
    }

    /// Rotates by `degrees` (positive is counterclockwise), wrapping the
    /// heading into [0, 360).
    pub fn turn(&mut self, degrees: i32) {
        self.heading = (self.heading + degrees).rem_euclid(360);
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> i32 {
        self.heading
    }
}

/// Clonable handle to a mutex-guarded [`Walker`].
///
/// Every operation takes the lock for exactly one mutation or one snapshot
/// read and releases it before returning; nothing holds it across a channel
/// call. Mutating operations hand back the post-mutation value from the
/// same critical section so callers can report it without a second lock.
#[derive(Clone)]
pub struct SharedWalker {
    inner: Arc<Mutex<Walker>>,
}

impl SharedWalker {
    pub fn new(start: Position, heading: i32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Walker::new(start, heading))),
        }
    }

    /// Steps along the current heading and returns the new position.
    pub fn step(&self, distance: f64) -> Position {
        let mut walker = self.lock();
        walker.step(distance);
        walker.position()
    }

    /// Turns by `degrees` and returns the new heading.
    pub fn turn(&self, degrees: i32) -> i32 {
        let mut walker = self.lock();
        walker.turn(degrees);
        walker.heading()
    }

    pub fn position(&self) -> Position {
        self.lock().position()
    }

    pub fn heading(&self) -> i32 {
        self.lock().heading()
    }

    fn lock(&self) -> MutexGuard<'_, Walker> {
        self.inner.lock().expect("walker lock poisoned")
    }
}
