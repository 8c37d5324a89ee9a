//! Infrastructure layer for pikb.
//!
//! Contains OS-facing adapters: evdev input devices, USB gadget output,
//! the terminal echo, and file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `pikb_core`, but MUST NOT be imported by the `application` or domain
//! layers (except from their tests).
//!
//! # Sub-modules
//!
//! - **`input_source`** – `LiveSource` reads the keyboard and mouse evdev
//!   devices (Linux only).  A `ScriptedSource` is also provided for tests.
//!
//! - **`output_sink`** – `GadgetSink` writes reports to `/dev/hidg0` and
//!   `/dev/hidg1` (Linux only), `NullSink` discards them in no-USB mode, and
//!   `RecordingSink` keeps them for tests.
//!
//! - **`echo`** – Prints each report as a hex line on stdout.
//!
//! - **`storage`** – Model presets, the TOML config file, and reading and
//!   creating macro files.

pub mod echo;
pub mod input_source;
pub mod output_sink;
pub mod storage;
