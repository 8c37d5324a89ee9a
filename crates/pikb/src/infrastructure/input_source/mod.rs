//! Input source implementations.
//!
//! The live evdev reader is only compiled on Linux.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod live;
