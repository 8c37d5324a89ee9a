//! Raw kernel input events and the two device kinds pikb forwards.
//!
//! A Linux `input_event` is a `(type, code, value)` triple.  Only three event
//! types matter here: `EV_KEY` (keys and mouse buttons), `EV_REL` (relative
//! motion and wheels) and `EV_SYN` (frame boundaries).  Everything else
//! (LEDs, misc scan codes, autorepeat settings) is carried as
//! [`RawInputEvent::Other`] and ignored by the tracker.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Kernel constants (linux/input-event-codes.h) ──────────────────────────────

pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;

pub const SYN_REPORT: u16 = 0;
pub const SYN_DROPPED: u16 = 3;

pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;
pub const REL_HWHEEL: u16 = 0x06;
pub const REL_WHEEL: u16 = 0x08;
pub const REL_WHEEL_HI_RES: u16 = 0x0B;
pub const REL_HWHEEL_HI_RES: u16 = 0x0C;

pub const BTN_LEFT: u16 = 0x110;
pub const BTN_RIGHT: u16 = 0x111;
pub const BTN_MIDDLE: u16 = 0x112;
pub const BTN_SIDE: u16 = 0x113;
pub const BTN_EXTRA: u16 = 0x114;

/// Which physical device (and which gadget function) an event or report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Keyboard,
    Mouse,
}

impl DeviceKind {
    /// Both kinds, keyboard first.
    pub const ALL: [DeviceKind; 2] = [DeviceKind::Keyboard, DeviceKind::Mouse];

    /// Single-letter prefix used on terminal echo lines (`K:` / `M:`).
    pub fn echo_tag(self) -> char {
        match self {
            DeviceKind::Keyboard => 'K',
            DeviceKind::Mouse => 'M',
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Keyboard => f.write_str("keyboard"),
            DeviceKind::Mouse => f.write_str("mouse"),
        }
    }
}

/// The `value` of an `EV_KEY` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Release,
    Press,
    /// Kernel autorepeat; never produces a report.
    Repeat,
}

/// A decoded kernel input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInputEvent {
    /// A key or button changed state.
    Key { code: u16, action: KeyAction },
    /// Relative motion on one axis (pointer or wheel).
    Relative { axis: u16, delta: i32 },
    /// `SYN_REPORT`: the end of one hardware frame.
    Sync,
    /// `SYN_DROPPED`: the kernel buffer overflowed and events were lost.
    Dropped,
    /// Any other event type or an out-of-range key value.
    Other { event_type: u16, code: u16 },
}

impl RawInputEvent {
    /// Builds an event from the kernel's `(type, code, value)` triple.
    pub fn from_kernel(event_type: u16, code: u16, value: i32) -> Self {
        match (event_type, code, value) {
            (EV_KEY, code, 0) => RawInputEvent::Key { code, action: KeyAction::Release },
            (EV_KEY, code, 1) => RawInputEvent::Key { code, action: KeyAction::Press },
            (EV_KEY, code, 2) => RawInputEvent::Key { code, action: KeyAction::Repeat },
            (EV_REL, axis, delta) => RawInputEvent::Relative { axis, delta },
            (EV_SYN, SYN_REPORT, _) => RawInputEvent::Sync,
            (EV_SYN, SYN_DROPPED, _) => RawInputEvent::Dropped,
            (event_type, code, _) => RawInputEvent::Other { event_type, code },
        }
    }

    pub fn key_down(code: u16) -> Self {
        RawInputEvent::Key { code, action: KeyAction::Press }
    }

    pub fn key_up(code: u16) -> Self {
        RawInputEvent::Key { code, action: KeyAction::Release }
    }

    pub fn relative(axis: u16, delta: i32) -> Self {
        RawInputEvent::Relative { axis, delta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_map_to_actions() {
        assert_eq!(
            RawInputEvent::from_kernel(EV_KEY, 30, 1),
            RawInputEvent::key_down(30)
        );
        assert_eq!(
            RawInputEvent::from_kernel(EV_KEY, 30, 0),
            RawInputEvent::key_up(30)
        );
        assert_eq!(
            RawInputEvent::from_kernel(EV_KEY, 30, 2),
            RawInputEvent::Key { code: 30, action: KeyAction::Repeat }
        );
    }

    #[test]
    fn test_unexpected_key_value_is_other() {
        assert_eq!(
            RawInputEvent::from_kernel(EV_KEY, 30, 7),
            RawInputEvent::Other { event_type: EV_KEY, code: 30 }
        );
    }

    #[test]
    fn test_relative_keeps_signed_delta() {
        assert_eq!(
            RawInputEvent::from_kernel(EV_REL, REL_Y, -3),
            RawInputEvent::relative(REL_Y, -3)
        );
    }

    #[test]
    fn test_sync_codes_are_distinguished() {
        assert_eq!(RawInputEvent::from_kernel(EV_SYN, SYN_REPORT, 0), RawInputEvent::Sync);
        assert_eq!(RawInputEvent::from_kernel(EV_SYN, SYN_DROPPED, 0), RawInputEvent::Dropped);
        // EV_MSC / MSC_SCAN
        assert_eq!(
            RawInputEvent::from_kernel(0x04, 0x04, 458_756),
            RawInputEvent::Other { event_type: 0x04, code: 0x04 }
        );
    }

    #[test]
    fn test_device_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DeviceKind::Keyboard).expect("serialize");
        assert_eq!(json, "\"keyboard\"");
        assert_eq!(DeviceKind::Mouse.to_string(), "mouse");
        assert_eq!(DeviceKind::Mouse.echo_tag(), 'M');
    }
}
