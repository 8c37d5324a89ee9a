//! # pikb-core
//!
//! Shared library for pikb containing the HID report codec, the device state
//! tracker, the hotkey detector and the macro record format.
//!
//! It has zero dependencies on OS APIs: no device files, no terminals, no
//! clocks.  Everything here can be exercised from plain unit tests.
//!
//! # Architecture overview (for beginners)
//!
//! pikb turns a keyboard and a mouse attached to a small Linux board into a
//! USB keyboard and mouse for a second computer (the "destination").  The
//! board reads raw kernel input events, keeps track of which keys and buttons
//! are held, and writes fixed-size *HID boot reports* into USB gadget files.
//!
//! This crate (`pikb-core`) is the pure foundation.  It defines:
//!
//! - **`keymap`** – Translation from Linux evdev key codes to USB HID Usage
//!   IDs, the numbers that actually go into a keyboard report.
//!
//! - **`report`** – The 8-byte keyboard and 4-byte mouse report layouts, how
//!   they are encoded from device state, decoded for display, and the static
//!   report descriptors that announce those layouts to the destination.
//!
//! - **`domain`** – Raw input events, the per-device state tracker, the
//!   reserved hotkey chords, the engine's capture/exit state machine and the
//!   resolved device configuration.
//!
//! - **`recording`** – The JSON-lines macro format used to record a report
//!   stream and replay it later with the original timing.

pub mod domain;
pub mod keymap;
pub mod recording;
pub mod report;

// Re-export the most-used types at the crate root so callers can write
// `pikb_core::HidReport` instead of `pikb_core::report::codec::HidReport`.
pub use domain::device_config::{DeviceConfig, InputDeviceConfig, SpoofIdentity};
pub use domain::engine_state::{EngineState, LoopPhase};
pub use domain::hotkey::Hotkey;
pub use domain::input::{DeviceKind, KeyAction, RawInputEvent};
pub use domain::state::{DeviceStateTracker, KeyboardState, ModifierMask, MouseState, TrackerOutput};
pub use keymap::hid::HidKeyCode;
pub use recording::event::{MacroError, MacroEvent};
pub use report::codec::{decode, encode_keyboard, encode_mouse, HidReport, ReportError, ReportSnapshot};
