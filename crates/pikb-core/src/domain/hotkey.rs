//! Reserved modifier chords that control pikb instead of being forwarded.
//!
//! | Chord                  | Action                          |
//! |------------------------|---------------------------------|
//! | Ctrl + Meta            | toggle capture on/off           |
//! | Ctrl + Shift + Meta    | exit after releasing everything |
//!
//! On Pi 400 / Pi 500 keyboards Meta is the Raspberry key.  Either the left
//! or the right key of each modifier counts.  A chord only fires while no
//! ordinary key is held, so Ctrl+Meta+L (a lock-screen shortcut on the
//! destination) still goes through.

use crate::domain::state::KeyboardState;

/// A detected control chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    ToggleCapture,
    Exit,
}

/// Checks the keyboard state for a control chord.
///
/// Call this only after a key-down transition so a held chord fires once.
/// Uses the physically held modifiers, so a chord still fires while its
/// modifiers are hidden from reports.
pub fn detect(state: &KeyboardState) -> Option<Hotkey> {
    if state.has_keys() {
        return None;
    }
    let mods = state.modifiers();
    if !(mods.ctrl() && mods.meta()) {
        return None;
    }
    if mods.shift() {
        Some(Hotkey::Exit)
    } else {
        Some(Hotkey::ToggleCapture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::HidKeyCode;

    fn state_with(keys: &[HidKeyCode]) -> KeyboardState {
        let mut state = KeyboardState::new();
        for &key in keys {
            state.press(key);
        }
        state
    }

    #[test]
    fn test_ctrl_meta_toggles_capture() {
        let state = state_with(&[HidKeyCode::ControlLeft, HidKeyCode::MetaLeft]);
        assert_eq!(detect(&state), Some(Hotkey::ToggleCapture));
    }

    #[test]
    fn test_right_side_modifiers_also_count() {
        let state = state_with(&[HidKeyCode::ControlRight, HidKeyCode::MetaRight]);
        assert_eq!(detect(&state), Some(Hotkey::ToggleCapture));
    }

    #[test]
    fn test_ctrl_shift_meta_exits() {
        let state = state_with(&[
            HidKeyCode::ControlLeft,
            HidKeyCode::ShiftLeft,
            HidKeyCode::MetaLeft,
        ]);
        assert_eq!(detect(&state), Some(Hotkey::Exit));
    }

    #[test]
    fn test_chord_with_an_ordinary_key_is_forwarded() {
        let state = state_with(&[
            HidKeyCode::ControlLeft,
            HidKeyCode::MetaLeft,
            HidKeyCode::KeyL,
        ]);
        assert_eq!(detect(&state), None);
    }

    #[test]
    fn test_partial_chords_do_nothing() {
        assert_eq!(detect(&state_with(&[HidKeyCode::ControlLeft])), None);
        assert_eq!(detect(&state_with(&[HidKeyCode::MetaLeft])), None);
        assert_eq!(
            detect(&state_with(&[HidKeyCode::ShiftLeft, HidKeyCode::MetaLeft])),
            None
        );
    }

    #[test]
    fn test_suppressed_modifiers_still_form_a_chord() {
        let mut state = state_with(&[HidKeyCode::ControlLeft, HidKeyCode::MetaLeft]);
        state.suppress_held_modifiers();
        assert_eq!(detect(&state), Some(Hotkey::ToggleCapture));
    }
}
