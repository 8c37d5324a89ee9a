//! Key code translation tables.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07, Keyboard/Keypad),
//! since that is what the destination reads out of a keyboard report.
//! Linux evdev codes are translated to HID at the input boundary.

pub mod hid;
pub mod linux_evdev;

pub use hid::HidKeyCode;

/// Unified key mapper used by the device state tracker.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a Linux evdev `EV_KEY` code to a [`HidKeyCode`].
    ///
    /// Returns [`HidKeyCode::Unknown`] if no mapping exists for `code`.
    pub fn evdev_to_hid(code: u16) -> HidKeyCode {
        linux_evdev::evdev_to_hid(code)
    }

    /// Translates a keycode slot of a keyboard boot report back to a [`HidKeyCode`].
    ///
    /// Returns `None` for the empty slot value `0x00`.
    pub fn report_byte_to_hid(byte: u8) -> Option<HidKeyCode> {
        match byte {
            0x00 => None,
            b => Some(HidKeyCode::from_u16(u16::from(b))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evdev_to_hid_delegates_to_table() {
        assert_eq!(KeyMapper::evdev_to_hid(30), HidKeyCode::KeyA);
        assert_eq!(KeyMapper::evdev_to_hid(0x110), HidKeyCode::Unknown);
    }

    #[test]
    fn test_report_byte_zero_is_an_empty_slot() {
        assert_eq!(KeyMapper::report_byte_to_hid(0x00), None);
        assert_eq!(KeyMapper::report_byte_to_hid(0x04), Some(HidKeyCode::KeyA));
        assert_eq!(
            KeyMapper::report_byte_to_hid(0x01),
            Some(HidKeyCode::Unknown)
        );
    }
}
