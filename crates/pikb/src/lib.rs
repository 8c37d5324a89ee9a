//! pikb library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does pikb do? (for beginners)
//!
//! A Raspberry Pi 400 or 500 is a computer built into a keyboard.  With its
//! USB port in *gadget* mode it can also pretend to be a USB keyboard and
//! mouse for a second computer (the *destination*).  pikb makes that happen:
//!
//! 1. Opens the Pi's own keyboard and an attached mouse through the Linux
//!    evdev interface (`/dev/input/...`).
//! 2. Tracks which keys and buttons are held and turns every change into a
//!    fixed-size HID boot report (8 bytes for the keyboard, 4 for the mouse).
//! 3. Writes each report to a USB gadget character file (`/dev/hidg0`,
//!    `/dev/hidg1`), which the kernel delivers to the destination.
//! 4. Watches for two reserved chords: Ctrl+Meta pauses or resumes
//!    forwarding, Ctrl+Shift+Meta exits.
//! 5. Optionally records the report stream to a file, or plays a recording
//!    back with its original timing instead of reading live input.

/// Application layer: the forwarding loop, macro recording and playback.
pub mod application;

/// Infrastructure layer: evdev input, gadget output, terminal echo, storage.
pub mod infrastructure;
