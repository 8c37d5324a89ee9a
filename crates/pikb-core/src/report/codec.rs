//! Encoding and decoding of HID boot reports.
//!
//! Keyboard report (8 bytes):
//! ```text
//! [modifiers:1][reserved:1][key0..key5:6]
//! ```
//! Mouse report (4 bytes):
//! ```text
//! [buttons:1][dx:i8][dy:i8][wheel:i8]
//! ```
//! There is no report ID: keyboard and mouse are separate gadget functions,
//! each with its own character file.

use std::fmt;

use thiserror::Error;

use crate::domain::input::DeviceKind;
use crate::domain::state::{KeyboardState, ModifierMask, MouseState, MAX_PRESSED_KEYS};
use crate::keymap::{HidKeyCode, KeyMapper};

pub const KEYBOARD_REPORT_LEN: usize = 8;
pub const MOUSE_REPORT_LEN: usize = 4;

/// Errors produced when raw bytes do not form a valid report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The byte count does not match the fixed layout for the device.
    #[error("{kind} report must be {expected} bytes, got {actual}")]
    InvalidLength {
        kind: DeviceKind,
        expected: usize,
        actual: usize,
    },
}

/// One encoded boot report, ready to be written to a gadget file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HidReport {
    Keyboard([u8; KEYBOARD_REPORT_LEN]),
    Mouse([u8; MOUSE_REPORT_LEN]),
}

impl HidReport {
    /// No modifiers, no keys.
    pub const KEYBOARD_RELEASED: HidReport = HidReport::Keyboard([0; KEYBOARD_REPORT_LEN]);
    /// No buttons, no motion.
    pub const MOUSE_RELEASED: HidReport = HidReport::Mouse([0; MOUSE_REPORT_LEN]);

    /// The all-released report for `kind`.
    pub fn released(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Keyboard => Self::KEYBOARD_RELEASED,
            DeviceKind::Mouse => Self::MOUSE_RELEASED,
        }
    }

    /// Fixed report length for `kind`.
    pub fn len_for(kind: DeviceKind) -> usize {
        match kind {
            DeviceKind::Keyboard => KEYBOARD_REPORT_LEN,
            DeviceKind::Mouse => MOUSE_REPORT_LEN,
        }
    }

    /// Builds a report from raw bytes, checking the length for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidLength`] if `bytes` is not exactly the
    /// report length for `kind`.
    pub fn from_bytes(kind: DeviceKind, bytes: &[u8]) -> Result<Self, ReportError> {
        let invalid = || ReportError::InvalidLength {
            kind,
            expected: Self::len_for(kind),
            actual: bytes.len(),
        };
        match kind {
            DeviceKind::Keyboard => bytes
                .try_into()
                .map(HidReport::Keyboard)
                .map_err(|_| invalid()),
            DeviceKind::Mouse => bytes.try_into().map(HidReport::Mouse).map_err(|_| invalid()),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            HidReport::Keyboard(_) => DeviceKind::Keyboard,
            HidReport::Mouse(_) => DeviceKind::Mouse,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HidReport::Keyboard(bytes) => bytes,
            HidReport::Mouse(bytes) => bytes,
        }
    }

    pub fn is_released(&self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes the keyboard state as an 8-byte boot report.
///
/// Keys appear in press order; unused slots stay `0x00`.  Suppressed
/// modifiers are left out of the modifier byte.
///
/// # Examples
///
/// ```rust
/// use pikb_core::keymap::HidKeyCode;
/// use pikb_core::{encode_keyboard, KeyboardState};
///
/// let mut state = KeyboardState::new();
/// state.press(HidKeyCode::KeyA);
/// state.press(HidKeyCode::ControlLeft);
/// let report = encode_keyboard(&state);
/// assert_eq!(report.as_bytes(), &[0x01, 0x00, 0x04, 0, 0, 0, 0, 0]);
/// ```
pub fn encode_keyboard(state: &KeyboardState) -> HidReport {
    let mut buf = [0u8; KEYBOARD_REPORT_LEN];
    buf[0] = state.reported_modifiers().0;
    for (slot, key) in buf[2..]
        .iter_mut()
        .zip(state.pressed_keys().iter().take(MAX_PRESSED_KEYS))
    {
        *slot = key.as_report_byte();
    }
    HidReport::Keyboard(buf)
}

/// Encodes the mouse buttons and pending deltas as a 4-byte boot report.
///
/// Deltas outside `-127..=127` are clamped.  The caller is responsible for
/// clearing the pending deltas afterwards.
pub fn encode_mouse(state: &MouseState) -> HidReport {
    let (dx, dy) = state.pending_motion();
    HidReport::Mouse([
        state.buttons(),
        clamp_axis(dx),
        clamp_axis(dy),
        clamp_axis(state.pending_wheel()),
    ])
}

fn clamp_axis(value: i32) -> u8 {
    value.clamp(-127, 127) as i8 as u8
}

// ── Decoding (display only) ───────────────────────────────────────────────────

/// Human-readable view of a report, used by the terminal echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSnapshot {
    Keyboard {
        modifiers: ModifierMask,
        keys: Vec<HidKeyCode>,
    },
    Mouse {
        buttons: u8,
        dx: i8,
        dy: i8,
        wheel: i8,
    },
}

/// Decodes raw report bytes for display.
///
/// Keyboard keys come back in slot order with empty slots skipped; slot
/// values with no known usage decode as [`HidKeyCode::Unknown`].
///
/// # Errors
///
/// Returns [`ReportError::InvalidLength`] if `bytes` has the wrong length for `kind`.
pub fn decode(bytes: &[u8], kind: DeviceKind) -> Result<ReportSnapshot, ReportError> {
    let report = HidReport::from_bytes(kind, bytes)?;
    Ok(ReportSnapshot::from(&report))
}

impl From<&HidReport> for ReportSnapshot {
    fn from(report: &HidReport) -> Self {
        match report {
            HidReport::Keyboard(bytes) => ReportSnapshot::Keyboard {
                modifiers: ModifierMask(bytes[0]),
                keys: bytes[2..]
                    .iter()
                    .filter_map(|&b| KeyMapper::report_byte_to_hid(b))
                    .collect(),
            },
            HidReport::Mouse(bytes) => ReportSnapshot::Mouse {
                buttons: bytes[0],
                dx: bytes[1] as i8,
                dy: bytes[2] as i8,
                wheel: bytes[3] as i8,
            },
        }
    }
}

impl fmt::Display for ReportSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSnapshot::Keyboard { modifiers, keys } => {
                write!(f, "mods={modifiers} keys=[")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}")?;
                }
                f.write_str("]")
            }
            ReportSnapshot::Mouse { buttons, dx, dy, wheel } => {
                write!(f, "buttons={buttons:05b} dx={dx} dy={dy} wheel={wheel}")
            }
        }
    }
}

/// Formats a report as a terminal echo line, e.g. `K: 01 00 04 00 00 00 00 00`.
///
/// With `annotate`, the decoded snapshot is appended in parentheses.
pub fn format_report_line(report: &HidReport, annotate: bool) -> String {
    let hex: Vec<String> = report.as_bytes().iter().map(|b| format!("{b:02x}")).collect();
    let line = format!("{}: {}", report.kind().echo_tag(), hex.join(" "));
    if annotate {
        format!("{line}  ({})", ReportSnapshot::from(report))
    } else {
        line
    }
}
