//! Pure domain logic with no OS dependencies.
//!
//! # Sub-modules
//!
//! - **`input`** – Raw kernel input events and the keyboard/mouse device kinds.
//! - **`state`** – The device state tracker that turns events into reports.
//! - **`hotkey`** – Detection of the reserved toggle and exit chords.
//! - **`engine_state`** – The Idle/Capturing/Draining/Stopped state machine.
//! - **`device_config`** – The resolved per-run device configuration.

pub mod device_config;
pub mod engine_state;
pub mod hotkey;
pub mod input;
pub mod state;
