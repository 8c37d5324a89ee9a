//! HID boot reports: the fixed byte layouts written to the gadget files.
//!
//! # Sub-modules
//!
//! - **`codec`** – Encodes keyboard/mouse state into 8-byte and 4-byte
//!   reports and decodes raw bytes back into a printable snapshot.
//!
//! - **`descriptor`** – The static report descriptors that tell the
//!   destination computer how to read those bytes.

pub mod codec;
pub mod descriptor;

pub use codec::{
    decode, encode_keyboard, encode_mouse, format_report_line, HidReport, ReportError,
    ReportSnapshot, KEYBOARD_REPORT_LEN, MOUSE_REPORT_LEN,
};
pub use descriptor::{KEYBOARD_REPORT_DESCRIPTOR, MOUSE_REPORT_DESCRIPTOR};
