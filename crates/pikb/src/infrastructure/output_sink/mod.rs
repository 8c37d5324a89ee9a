//! Output sink implementations.
//!
//! The gadget writer is only compiled on Linux.

pub mod mock;
pub mod null;

#[cfg(target_os = "linux")]
pub mod gadget;
