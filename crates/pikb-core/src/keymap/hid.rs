//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! These are the numbers written into the keycode slots of a keyboard boot
//! report.  Linux evdev codes are translated to this representation at the
//! input boundary, see [`super::linux_evdev`].
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # What is a HID Usage ID? (for beginners)
//!
//! The **USB Human Interface Device (HID)** standard assigns a unique number to
//! every key on a keyboard.  These numbers are called *Usage IDs* and they are
//! grouped by *Usage Page*.  All keyboard keys are on page 0x07 ("Keyboard/Keypad").
//!
//! | Key          | HID Usage ID |
//! |--------------|-------------|
//! | Letter A     | 0x04        |
//! | Enter        | 0x28        |
//! | Left Ctrl    | 0xE0        |
//! | Right GUI    | 0xE7        |
//!
//! HID codes represent **physical key positions**, not characters.  The
//! destination computer applies its own keyboard layout, so pikb never needs
//! to know whether the user types QWERTY or AZERTY.
//!
//! The eight modifier keys (0xE0–0xE7) are special: a boot report does not
//! put them in the keycode slots but sets one bit per modifier in the first
//! byte instead.  [`HidKeyCode::modifier_bit`] gives that bit.

use serde::{Deserialize, Serialize};

/// USB HID Usage ID for keyboard keys (page 0x07).
///
/// The numeric value of each variant is its HID Usage ID on the keyboard/keypad page.
/// [`HidKeyCode::Unknown`] represents any key that has no mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum HidKeyCode {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control and punctuation keys (HID 0x28–0x38; 0x32 is the ISO hash key,
    // which evdev reports as KEY_BACKSLASH, so it is never produced)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    // Lock keys
    CapsLock = 0x39,

    // Function keys (HID 0x3A–0x45)
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster (HID 0x46–0x52)
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Numpad (HID 0x53–0x63)
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    // ISO key between left shift and Z (HID 0x64)
    NonUsBackslash = 0x64,

    // Application / power (HID 0x65–0x67)
    ContextMenu = 0x65,
    Power = 0x66,
    NumpadEqual = 0x67,

    // Extended function keys (HID 0x68–0x73)
    F13 = 0x68,
    F14 = 0x69,
    F15 = 0x6A,
    F16 = 0x6B,
    F17 = 0x6C,
    F18 = 0x6D,
    F19 = 0x6E,
    F20 = 0x6F,
    F21 = 0x70,
    F22 = 0x71,
    F23 = 0x72,
    F24 = 0x73,

    // Volume keys (HID 0x7F–0x81)
    Mute = 0x7F,
    VolumeUp = 0x80,
    VolumeDown = 0x81,

    // Modifier keys (HID 0xE0–0xE7)
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,

    /// Sentinel for keys with no HID mapping.
    Unknown = 0x0000,
}

impl HidKeyCode {
    /// Converts a raw u16 HID Usage ID to a [`HidKeyCode`].
    ///
    /// Returns [`HidKeyCode::Unknown`] for IDs pikb never emits.
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x04..=0x73 => usage_block::MAIN[usize::from(value - 0x04)],
            0x7F => HidKeyCode::Mute,
            0x80 => HidKeyCode::VolumeUp,
            0x81 => HidKeyCode::VolumeDown,
            0xE0..=0xE7 => usage_block::MODIFIERS[usize::from(value - 0xE0)],
            _ => HidKeyCode::Unknown,
        }
    }

    /// Returns the raw USB HID Usage ID value for this key code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the Usage ID as it appears in a keycode slot of a boot report.
    ///
    /// Every variant on this page fits in one byte.
    pub fn as_report_byte(self) -> u8 {
        self as u16 as u8
    }

    /// Returns `true` if this is a modifier key.
    pub fn is_modifier(self) -> bool {
        self.modifier_bit().is_some()
    }

    /// Returns the bit this key occupies in the boot report modifier byte.
    ///
    /// Bit `n` belongs to Usage ID `0xE0 + n`, so left ctrl is bit 0 and
    /// right GUI is bit 7.  Returns `None` for non-modifier keys.
    pub fn modifier_bit(self) -> Option<u8> {
        match self {
            HidKeyCode::ControlLeft
            | HidKeyCode::ShiftLeft
            | HidKeyCode::AltLeft
            | HidKeyCode::MetaLeft
            | HidKeyCode::ControlRight
            | HidKeyCode::ShiftRight
            | HidKeyCode::AltRight
            | HidKeyCode::MetaRight => Some(1 << (self.as_u16() - 0xE0)),
            _ => None,
        }
    }
}

/// Contiguous Usage ID ranges, in ID order, for [`HidKeyCode::from_u16`].
mod usage_block {
    use super::HidKeyCode::{self, *};

    /// Usage IDs `0x04..=0x73`; index `n` holds ID `0x04 + n`.
    pub(super) const MAIN: [HidKeyCode; 0x70] = [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, // 0x04
        KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, // 0x0C
        KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, // 0x14
        KeyY, KeyZ, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, // 0x1C
        Digit7, Digit8, Digit9, Digit0, Enter, Escape, Backspace, Tab, // 0x24
        Space, Minus, Equal, BracketLeft, BracketRight, Backslash, Unknown, Semicolon, // 0x2C
        Quote, Backquote, Comma, Period, Slash, CapsLock, F1, F2, // 0x34
        F3, F4, F5, F6, F7, F8, F9, F10, // 0x3C
        F11, F12, PrintScreen, ScrollLock, Pause, Insert, Home, PageUp, // 0x44
        Delete, End, PageDown, ArrowRight, ArrowLeft, ArrowDown, ArrowUp, NumLock, // 0x4C
        NumpadDivide, NumpadMultiply, NumpadSubtract, NumpadAdd, NumpadEnter, Numpad1, Numpad2, Numpad3, // 0x54
        Numpad4, Numpad5, Numpad6, Numpad7, Numpad8, Numpad9, Numpad0, NumpadDecimal, // 0x5C
        NonUsBackslash, ContextMenu, Power, NumpadEqual, F13, F14, F15, F16, // 0x64
        F17, F18, F19, F20, F21, F22, F23, F24, // 0x6C
    ];

    /// Usage IDs `0xE0..=0xE7`, which are also the modifier byte's bit order.
    pub(super) const MODIFIERS: [HidKeyCode; 8] = [
        ControlLeft, ShiftLeft, AltLeft, MetaLeft, ControlRight, ShiftRight, AltRight, MetaRight,
    ];
}
