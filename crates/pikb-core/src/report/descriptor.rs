//! Static HID report descriptors for the two gadget functions.
//!
//! The descriptor is what the destination reads at enumeration time to learn
//! the report layout.  pikb uses the boot layouts and never renegotiates
//! them, so the descriptors are plain byte constants.  They are written into
//! the gadget's `report_desc` by the installation scripts; `pikb describe`
//! prints them.

use super::codec::{KEYBOARD_REPORT_LEN, MOUSE_REPORT_LEN};

/// Keyboard boot report descriptor (8-byte input report, LED output report).
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    // Modifier byte
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224) - Left Control
    0x29, 0xE7, //   Usage Maximum (231) - Right GUI
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    // Reserved byte
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    // LEDs: Num Lock, Caps Lock, Scroll Lock + padding
    0x95, 0x03, //   Report Count (3)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x03, //   Usage Maximum (3)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x91, 0x01, //   Output (Constant)
    // Key array
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x2A, 0xFF, 0x00, // Usage Maximum (255)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

/// Relative mouse boot report descriptor (4-byte input report, 5 buttons).
pub const MOUSE_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    // Buttons
    0x05, 0x09, //     Usage Page (Button)
    0x19, 0x01, //     Usage Minimum (1)
    0x29, 0x05, //     Usage Maximum (5)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x05, //     Report Count (5)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x03, //     Report Size (3)
    0x81, 0x01, //     Input (Constant) - padding
    // X, Y, wheel
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x09, 0x38, //     Usage (Wheel)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x03, //     Report Count (3)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection
    0xC0, // End Collection
];

/// Size in bits of every `Input` item in `descriptor`, summed.
///
/// Only understands the short items used above; enough to check that each
/// descriptor matches the report length the codec produces.
fn input_report_bits(descriptor: &[u8]) -> usize {
    let mut bits = 0;
    let mut report_size = 0usize;
    let mut report_count = 0usize;
    let mut i = 0;
    while i < descriptor.len() {
        let prefix = descriptor[i];
        let data_len = match prefix & 0x03 {
            3 => 4,
            n => n as usize,
        };
        let value = descriptor
            .get(i + 1..i + 1 + data_len)
            .map(|data| {
                data.iter()
                    .rev()
                    .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
            })
            .unwrap_or(0);
        match prefix & 0xFC {
            0x74 => report_size = value,
            0x94 => report_count = value,
            0x80 => bits += report_size * report_count,
            _ => {}
        }
        i += 1 + data_len;
    }
    bits
}

/// Input report length in bytes declared by the keyboard descriptor.
pub fn keyboard_input_len() -> usize {
    input_report_bits(KEYBOARD_REPORT_DESCRIPTOR) / 8
}

/// Input report length in bytes declared by the mouse descriptor.
pub fn mouse_input_len() -> usize {
    input_report_bits(MOUSE_REPORT_DESCRIPTOR) / 8
}
