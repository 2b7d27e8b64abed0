//! geowalk walks a virtual device's GPS fix around from the keyboard,
//! keeping an emulator shell in sync in the background.

pub mod app;
pub mod console;
pub mod core;
pub mod input;
pub mod locate;
pub mod shutdown;

#[cfg(test)]
pub mod test_support;
