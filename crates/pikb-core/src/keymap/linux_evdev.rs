//! Linux evdev key code to HID Usage ID translation table.
//!
//! evdev key codes are defined in `linux/input-event-codes.h`.
//! Reference: https://github.com/torvalds/linux/blob/master/include/uapi/linux/input-event-codes.h
//!
//! # What is an evdev key code? (for beginners)
//!
//! On Linux every input device (keyboard, mouse, gamepad) is exposed as a
//! character file under `/dev/input/event*`.  Reading it yields a stream of
//! small `input_event` records: a *type* (key, relative motion, sync), a
//! *code* (which key or axis) and a *value* (pressed, released, distance).
//!
//! Key codes describe physical positions, just like HID Usage IDs, but the
//! numbering is different and historically follows the old PC/AT scan codes:
//!
//! | evdev name     | evdev code | HID Usage ID |
//! |----------------|-----------|--------------|
//! | `KEY_ESC`      | 1         | 0x29         |
//! | `KEY_A`        | 30        | 0x04         |
//! | `KEY_LEFTCTRL` | 29        | 0xE0         |
//! | `KEY_LEFTMETA` | 125       | 0xE3         |
//!
//! The Raspberry key on a Pi 400 / Pi 500 keyboard reports `KEY_LEFTMETA`.

use super::hid::HidKeyCode;

/// Translates an evdev `EV_KEY` code to a [`HidKeyCode`].
///
/// Returns [`HidKeyCode::Unknown`] if the code has no HID keyboard equivalent
/// (mouse buttons, multimedia keys beyond volume, vendor keys).
pub fn evdev_to_hid(code: u16) -> HidKeyCode {
    match code {
        1 => HidKeyCode::Escape,      // KEY_ESC
        2 => HidKeyCode::Digit1,      // KEY_1
        3 => HidKeyCode::Digit2,      // KEY_2
        4 => HidKeyCode::Digit3,      // KEY_3
        5 => HidKeyCode::Digit4,      // KEY_4
        6 => HidKeyCode::Digit5,      // KEY_5
        7 => HidKeyCode::Digit6,      // KEY_6
        8 => HidKeyCode::Digit7,      // KEY_7
        9 => HidKeyCode::Digit8,      // KEY_8
        10 => HidKeyCode::Digit9,     // KEY_9
        11 => HidKeyCode::Digit0,     // KEY_0
        12 => HidKeyCode::Minus,      // KEY_MINUS
        13 => HidKeyCode::Equal,      // KEY_EQUAL
        14 => HidKeyCode::Backspace,  // KEY_BACKSPACE
        15 => HidKeyCode::Tab,        // KEY_TAB
        16 => HidKeyCode::KeyQ,       // KEY_Q
        17 => HidKeyCode::KeyW,       // KEY_W
        18 => HidKeyCode::KeyE,       // KEY_E
        19 => HidKeyCode::KeyR,       // KEY_R
        20 => HidKeyCode::KeyT,       // KEY_T
        21 => HidKeyCode::KeyY,       // KEY_Y
        22 => HidKeyCode::KeyU,       // KEY_U
        23 => HidKeyCode::KeyI,       // KEY_I
        24 => HidKeyCode::KeyO,       // KEY_O
        25 => HidKeyCode::KeyP,       // KEY_P
        26 => HidKeyCode::BracketLeft,  // KEY_LEFTBRACE
        27 => HidKeyCode::BracketRight, // KEY_RIGHTBRACE
        28 => HidKeyCode::Enter,        // KEY_ENTER
        29 => HidKeyCode::ControlLeft,  // KEY_LEFTCTRL
        30 => HidKeyCode::KeyA,       // KEY_A
        31 => HidKeyCode::KeyS,       // KEY_S
        32 => HidKeyCode::KeyD,       // KEY_D
        33 => HidKeyCode::KeyF,       // KEY_F
        34 => HidKeyCode::KeyG,       // KEY_G
        35 => HidKeyCode::KeyH,       // KEY_H
        36 => HidKeyCode::KeyJ,       // KEY_J
        37 => HidKeyCode::KeyK,       // KEY_K
        38 => HidKeyCode::KeyL,       // KEY_L
        39 => HidKeyCode::Semicolon,  // KEY_SEMICOLON
        40 => HidKeyCode::Quote,      // KEY_APOSTROPHE
        41 => HidKeyCode::Backquote,  // KEY_GRAVE
        42 => HidKeyCode::ShiftLeft,  // KEY_LEFTSHIFT
        43 => HidKeyCode::Backslash,  // KEY_BACKSLASH
        44 => HidKeyCode::KeyZ,       // KEY_Z
        45 => HidKeyCode::KeyX,       // KEY_X
        46 => HidKeyCode::KeyC,       // KEY_C
        47 => HidKeyCode::KeyV,       // KEY_V
        48 => HidKeyCode::KeyB,       // KEY_B
        49 => HidKeyCode::KeyN,       // KEY_N
        50 => HidKeyCode::KeyM,       // KEY_M
        51 => HidKeyCode::Comma,      // KEY_COMMA
        52 => HidKeyCode::Period,     // KEY_DOT
        53 => HidKeyCode::Slash,      // KEY_SLASH
        54 => HidKeyCode::ShiftRight, // KEY_RIGHTSHIFT
        55 => HidKeyCode::NumpadMultiply, // KEY_KPASTERISK
        56 => HidKeyCode::AltLeft,    // KEY_LEFTALT
        57 => HidKeyCode::Space,      // KEY_SPACE
        58 => HidKeyCode::CapsLock,   // KEY_CAPSLOCK
        59 => HidKeyCode::F1,         // KEY_F1
        60 => HidKeyCode::F2,         // KEY_F2
        61 => HidKeyCode::F3,         // KEY_F3
        62 => HidKeyCode::F4,         // KEY_F4
        63 => HidKeyCode::F5,         // KEY_F5
        64 => HidKeyCode::F6,         // KEY_F6
        65 => HidKeyCode::F7,         // KEY_F7
        66 => HidKeyCode::F8,         // KEY_F8
        67 => HidKeyCode::F9,         // KEY_F9
        68 => HidKeyCode::F10,        // KEY_F10
        69 => HidKeyCode::NumLock,    // KEY_NUMLOCK
        70 => HidKeyCode::ScrollLock, // KEY_SCROLLLOCK
        71 => HidKeyCode::Numpad7,    // KEY_KP7
        72 => HidKeyCode::Numpad8,    // KEY_KP8
        73 => HidKeyCode::Numpad9,    // KEY_KP9
        74 => HidKeyCode::NumpadSubtract, // KEY_KPMINUS
        75 => HidKeyCode::Numpad4,    // KEY_KP4
        76 => HidKeyCode::Numpad5,    // KEY_KP5
        77 => HidKeyCode::Numpad6,    // KEY_KP6
        78 => HidKeyCode::NumpadAdd,  // KEY_KPPLUS
        79 => HidKeyCode::Numpad1,    // KEY_KP1
        80 => HidKeyCode::Numpad2,    // KEY_KP2
        81 => HidKeyCode::Numpad3,    // KEY_KP3
        82 => HidKeyCode::Numpad0,    // KEY_KP0
        83 => HidKeyCode::NumpadDecimal, // KEY_KPDOT
        86 => HidKeyCode::NonUsBackslash, // KEY_102ND
        87 => HidKeyCode::F11,        // KEY_F11
        88 => HidKeyCode::F12,        // KEY_F12
        96 => HidKeyCode::NumpadEnter,  // KEY_KPENTER
        97 => HidKeyCode::ControlRight, // KEY_RIGHTCTRL
        98 => HidKeyCode::NumpadDivide, // KEY_KPSLASH
        99 => HidKeyCode::PrintScreen,  // KEY_SYSRQ
        100 => HidKeyCode::AltRight,    // KEY_RIGHTALT
        102 => HidKeyCode::Home,        // KEY_HOME
        103 => HidKeyCode::ArrowUp,     // KEY_UP
        104 => HidKeyCode::PageUp,      // KEY_PAGEUP
        105 => HidKeyCode::ArrowLeft,   // KEY_LEFT
        106 => HidKeyCode::ArrowRight,  // KEY_RIGHT
        107 => HidKeyCode::End,         // KEY_END
        108 => HidKeyCode::ArrowDown,   // KEY_DOWN
        109 => HidKeyCode::PageDown,    // KEY_PAGEDOWN
        110 => HidKeyCode::Insert,      // KEY_INSERT
        111 => HidKeyCode::Delete,      // KEY_DELETE
        113 => HidKeyCode::Mute,        // KEY_MUTE
        114 => HidKeyCode::VolumeDown,  // KEY_VOLUMEDOWN
        115 => HidKeyCode::VolumeUp,    // KEY_VOLUMEUP
        116 => HidKeyCode::Power,       // KEY_POWER
        117 => HidKeyCode::NumpadEqual, // KEY_KPEQUAL
        119 => HidKeyCode::Pause,       // KEY_PAUSE
        125 => HidKeyCode::MetaLeft,    // KEY_LEFTMETA
        126 => HidKeyCode::MetaRight,   // KEY_RIGHTMETA
        127 => HidKeyCode::ContextMenu, // KEY_COMPOSE
        183 => HidKeyCode::F13,         // KEY_F13
        184 => HidKeyCode::F14,         // KEY_F14
        185 => HidKeyCode::F15,         // KEY_F15
        186 => HidKeyCode::F16,         // KEY_F16
        187 => HidKeyCode::F17,         // KEY_F17
        188 => HidKeyCode::F18,         // KEY_F18
        189 => HidKeyCode::F19,         // KEY_F19
        190 => HidKeyCode::F20,         // KEY_F20
        191 => HidKeyCode::F21,         // KEY_F21
        192 => HidKeyCode::F22,         // KEY_F22
        193 => HidKeyCode::F23,         // KEY_F23
        194 => HidKeyCode::F24,         // KEY_F24
        _ => HidKeyCode::Unknown,
    }
}
