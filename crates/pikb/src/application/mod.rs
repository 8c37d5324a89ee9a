//! Application layer use cases for pikb.
//!
//! # What use cases does pikb have?
//!
//! - **`forward_input`** – The event loop.  It pulls items from an
//!   `InputSource`, runs them through the device state tracker and the
//!   hotkey detector, and fans every resulting report out to the terminal
//!   echo, the macro recorder and the `OutputSink`.  The traits for those
//!   three seams are defined here and implemented in the infrastructure layer.
//!
//! - **`record_macro`** – Appends each emitted report to a macro file with
//!   its time offset since recording started.
//!
//! - **`replay_macro`** – An `InputSource` that yields the reports of a
//!   loaded macro file, sleeping between them to reproduce the original
//!   timing.

pub mod forward_input;
pub mod record_macro;
pub mod replay_macro;
