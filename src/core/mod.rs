//! # Core domain
//!
//! The moving point and everything that decides where it goes next. It
//! knows how to walk and how to reconcile, not how keys are read or how
//! the shell process is spawned.
//!
//! ```text
//!      keystrokes                    ticks (every 100ms)
//!          │                              │
//!          ▼                              ▼
//!   ┌─────────────┐   snapshot    ┌──────────────┐   gps set*   ┌───────┐
//!   │   walker    │──────────────▶│     sync     │─────────────▶│ shell │
//!   │ (pos+head)  │   one mutex   │ (cursor cmp) │   + cache    └───────┘
//!   └─────────────┘               └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`position`]: the clamped latitude/longitude value type
//! - [`walker`]: position + heading, mutated by key commands
//! - [`sync`]: the background loop reconciling walker and shell
//! - [`cache`]: the one-line resume file
//! - [`config`]: settings and their override hierarchy

pub mod cache;
pub mod config;
pub mod position;
pub mod sync;
pub mod walker;
