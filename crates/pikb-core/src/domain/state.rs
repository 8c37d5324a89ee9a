//! Device state tracker: what is currently held on the keyboard and mouse.
//!
//! The destination computer does not receive key *events*; it receives
//! snapshots.  A keyboard boot report says "these modifiers and these (up to
//! six) keys are down right now".  A mouse report says "these buttons are
//! down and the pointer moved by this much since the last report".  This
//! module keeps the state those snapshots are built from.
//!
//! # Keyboard vs mouse (for beginners)
//!
//! - **Keyboard** state is persistent: a key stays in the set from its press
//!   until its release.  Every press or release produces a new report.
//! - **Mouse** motion is transient: relative deltas accumulate until the
//!   kernel closes the frame with `SYN_REPORT`, then one report carries the
//!   whole frame and the deltas are reset to zero.  Only the button bitmask
//!   survives from one report to the next.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::domain::input::{
    DeviceKind, KeyAction, RawInputEvent, BTN_EXTRA, BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, BTN_SIDE,
    REL_HWHEEL, REL_HWHEEL_HI_RES, REL_WHEEL, REL_WHEEL_HI_RES, REL_X, REL_Y,
};
use crate::keymap::{HidKeyCode, KeyMapper};
use crate::report::codec::{encode_keyboard, encode_mouse, HidReport};

/// Maximum number of simultaneously reported non-modifier keys in a boot report.
pub const MAX_PRESSED_KEYS: usize = 6;

/// The modifier byte of a keyboard boot report.
///
/// Bit positions follow the HID Usage order 0xE0–0xE7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierMask(pub u8);

impl ModifierMask {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const LEFT_SHIFT: u8 = 1 << 1;
    pub const LEFT_ALT: u8 = 1 << 2;
    pub const LEFT_META: u8 = 1 << 3;
    pub const RIGHT_CTRL: u8 = 1 << 4;
    pub const RIGHT_SHIFT: u8 = 1 << 5;
    pub const RIGHT_ALT: u8 = 1 << 6;
    pub const RIGHT_META: u8 = 1 << 7;

    const NAMES: [&'static str; 8] = [
        "LCtrl", "LShift", "LAlt", "LMeta", "RCtrl", "RShift", "RAlt", "RMeta",
    ];

    /// Returns `true` if either ctrl key is held.
    pub fn ctrl(self) -> bool {
        self.0 & (Self::LEFT_CTRL | Self::RIGHT_CTRL) != 0
    }

    /// Returns `true` if either shift key is held.
    pub fn shift(self) -> bool {
        self.0 & (Self::LEFT_SHIFT | Self::RIGHT_SHIFT) != 0
    }

    /// Returns `true` if either alt key is held.
    pub fn alt(self) -> bool {
        self.0 & (Self::LEFT_ALT | Self::RIGHT_ALT) != 0
    }

    /// Returns `true` if either meta (GUI / Raspberry) key is held.
    pub fn meta(self) -> bool {
        self.0 & (Self::LEFT_META | Self::RIGHT_META) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ModifierMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for (bit, name) in Self::NAMES.iter().enumerate() {
            if self.0 & (1 << bit) != 0 {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

// ── Keyboard ──────────────────────────────────────────────────────────────────

/// Held modifiers plus up to six held keys in press order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    modifiers: ModifierMask,
    keys: Vec<HidKeyCode>,
    /// Modifiers hidden from reports until they are physically released.
    suppressed: ModifierMask,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The physically held modifiers, including suppressed ones.
    pub fn modifiers(&self) -> ModifierMask {
        self.modifiers
    }

    /// The modifiers that go into the next report.
    pub fn reported_modifiers(&self) -> ModifierMask {
        ModifierMask(self.modifiers.0 & !self.suppressed.0)
    }

    /// Held non-modifier keys in the order they were pressed.
    pub fn pressed_keys(&self) -> &[HidKeyCode] {
        &self.keys
    }

    /// Returns `true` if at least one non-modifier key is held.
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.keys.is_empty()
    }

    /// Registers a key press.  Returns `true` if the state changed.
    ///
    /// A seventh simultaneous key is dropped: it is not queued and its later
    /// release is a no-op.
    pub fn press(&mut self, key: HidKeyCode) -> bool {
        if let Some(bit) = key.modifier_bit() {
            self.modifiers.0 |= bit;
            return true;
        }
        if self.keys.contains(&key) {
            return false;
        }
        if self.keys.len() >= MAX_PRESSED_KEYS {
            debug!(?key, "rollover: more than {MAX_PRESSED_KEYS} keys held, dropping press");
            return false;
        }
        self.keys.push(key);
        true
    }

    /// Registers a key release.  Returns `true` if the state changed.
    pub fn release(&mut self, key: HidKeyCode) -> bool {
        if let Some(bit) = key.modifier_bit() {
            self.modifiers.0 &= !bit;
            self.suppressed.0 &= !bit;
            return true;
        }
        match self.keys.iter().position(|&k| k == key) {
            Some(idx) => {
                self.keys.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Hides every currently held modifier from reports until it is released.
    pub fn suppress_held_modifiers(&mut self) {
        self.suppressed = self.modifiers;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ── Mouse ─────────────────────────────────────────────────────────────────────

/// Held buttons plus motion accumulated since the last report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MouseState {
    buttons: u8,
    dx: i32,
    dy: i32,
    wheel: i32,
    /// Set when the current frame changed anything and needs a report.
    dirty: bool,
}

impl MouseState {
    pub const BUTTON_LEFT: u8 = 1 << 0;
    pub const BUTTON_RIGHT: u8 = 1 << 1;
    pub const BUTTON_MIDDLE: u8 = 1 << 2;
    pub const BUTTON_SIDE: u8 = 1 << 3;
    pub const BUTTON_EXTRA: u8 = 1 << 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Maps an evdev `BTN_*` code to its report bit.
    pub fn button_bit(code: u16) -> Option<u8> {
        match code {
            BTN_LEFT => Some(Self::BUTTON_LEFT),
            BTN_RIGHT => Some(Self::BUTTON_RIGHT),
            BTN_MIDDLE => Some(Self::BUTTON_MIDDLE),
            BTN_SIDE => Some(Self::BUTTON_SIDE),
            BTN_EXTRA => Some(Self::BUTTON_EXTRA),
            _ => None,
        }
    }

    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Pending `(dx, dy)` motion, unclamped.
    pub fn pending_motion(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    pub fn pending_wheel(&self) -> i32 {
        self.wheel
    }

    pub fn set_button(&mut self, bit: u8, down: bool) {
        if down {
            self.buttons |= bit;
        } else {
            self.buttons &= !bit;
        }
        self.dirty = true;
    }

    pub fn add_motion(&mut self, dx: i32, dy: i32) {
        self.dx = self.dx.saturating_add(dx);
        self.dy = self.dy.saturating_add(dy);
        self.dirty = true;
    }

    pub fn add_wheel(&mut self, delta: i32) {
        self.wheel = self.wheel.saturating_add(delta);
        self.dirty = true;
    }

    /// Closes the current frame: encodes it and zeroes the pending deltas.
    ///
    /// Returns `None` when nothing changed since the last frame.
    pub fn take_frame(&mut self) -> Option<HidReport> {
        if !self.dirty {
            return None;
        }
        let report = encode_mouse(self);
        self.discard_motion();
        Some(report)
    }

    /// Drops pending motion without reporting it (buttons are kept).
    pub fn discard_motion(&mut self) {
        self.dx = 0;
        self.dy = 0;
        self.wheel = 0;
        self.dirty = false;
    }

    pub fn is_released(&self) -> bool {
        self.buttons == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ── Tracker ───────────────────────────────────────────────────────────────────

/// A report produced by applying one raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOutput {
    pub report: HidReport,
    /// `true` for keyboard key-down transitions, the only moment a hotkey chord is checked.
    pub hotkey_candidate: bool,
}

/// Keyboard and mouse state for one keyboard and one mouse.
#[derive(Debug, Default)]
pub struct DeviceStateTracker {
    keyboard: KeyboardState,
    mouse: MouseState,
    /// Set by a keyboard `SYN_DROPPED`; key events are skipped until the next `SYN_REPORT`.
    keyboard_resync: bool,
}

impl DeviceStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    /// Applies one raw event from `device` and returns the report it produces, if any.
    ///
    /// Unrecognised key codes and buttons are logged and ignored.
    pub fn apply(&mut self, device: DeviceKind, event: &RawInputEvent) -> Option<TrackerOutput> {
        match device {
            DeviceKind::Keyboard => self.apply_keyboard(event),
            DeviceKind::Mouse => self.apply_mouse(event),
        }
    }

    /// Forgets everything held on `device` (used when it disconnects).
    ///
    /// Returns the all-released report to forward if anything was held.
    pub fn reset(&mut self, device: DeviceKind) -> Option<HidReport> {
        match device {
            DeviceKind::Keyboard => {
                let was_empty = self.keyboard.is_empty();
                self.keyboard.clear();
                (!was_empty).then_some(HidReport::KEYBOARD_RELEASED)
            }
            DeviceKind::Mouse => {
                let was_released = self.mouse.is_released();
                self.mouse.clear();
                (!was_released).then_some(HidReport::MOUSE_RELEASED)
            }
        }
    }

    fn apply_keyboard(&mut self, event: &RawInputEvent) -> Option<TrackerOutput> {
        let (code, action) = match *event {
            RawInputEvent::Key { code, action } if !self.keyboard_resync => (code, action),
            RawInputEvent::Key { .. } => return None,
            RawInputEvent::Sync => {
                self.keyboard_resync = false;
                return None;
            }
            RawInputEvent::Dropped => {
                // The kernel lost events, so held keys are unknown: release everything.
                warn!("keyboard events dropped by the kernel, releasing all keys");
                self.keyboard_resync = true;
                return self.reset(DeviceKind::Keyboard).map(|report| TrackerOutput {
                    report,
                    hotkey_candidate: false,
                });
            }
            _ => return None,
        };
        let pressed = match action {
            KeyAction::Press => true,
            KeyAction::Release => false,
            KeyAction::Repeat => return None,
        };

        let key = KeyMapper::evdev_to_hid(code);
        if key == HidKeyCode::Unknown {
            warn!(code, "unrecognized keyboard key code ignored");
            return None;
        }

        let changed = if pressed {
            self.keyboard.press(key)
        } else {
            self.keyboard.release(key)
        };
        if !changed {
            return None;
        }

        trace!(?key, pressed, "keyboard state changed");
        Some(TrackerOutput {
            report: encode_keyboard(&self.keyboard),
            hotkey_candidate: pressed,
        })
    }

    fn apply_mouse(&mut self, event: &RawInputEvent) -> Option<TrackerOutput> {
        match *event {
            RawInputEvent::Key { code, action } => {
                let Some(bit) = MouseState::button_bit(code) else {
                    warn!(code, "unrecognized mouse button ignored");
                    return None;
                };
                match action {
                    KeyAction::Press => self.mouse.set_button(bit, true),
                    KeyAction::Release => self.mouse.set_button(bit, false),
                    KeyAction::Repeat => {}
                }
                None
            }
            RawInputEvent::Relative { axis, delta } => {
                match axis {
                    REL_X => self.mouse.add_motion(delta, 0),
                    REL_Y => self.mouse.add_motion(0, delta),
                    REL_WHEEL => self.mouse.add_wheel(delta),
                    // The boot report has no horizontal wheel; hi-res wheels duplicate REL_WHEEL.
                    REL_HWHEEL | REL_WHEEL_HI_RES | REL_HWHEEL_HI_RES => {}
                    other => trace!(axis = other, "unsupported relative axis ignored"),
                }
                None
            }
            RawInputEvent::Sync => self.mouse.take_frame().map(|report| TrackerOutput {
                report,
                hotkey_candidate: false,
            }),
            RawInputEvent::Dropped => {
                debug!("mouse events dropped by the kernel, discarding partial frame");
                self.mouse.discard_motion();
                None
            }
            RawInputEvent::Other { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input::SYN_REPORT;

    const KEY_A: u16 = 30;
    const KEY_S: u16 = 31;
    const KEY_LEFTCTRL: u16 = 29;
    const KEY_LEFTSHIFT: u16 = 42;

    fn press(tracker: &mut DeviceStateTracker, code: u16) -> Option<TrackerOutput> {
        tracker.apply(DeviceKind::Keyboard, &RawInputEvent::key_down(code))
    }

    fn release(tracker: &mut DeviceStateTracker, code: u16) -> Option<TrackerOutput> {
        tracker.apply(DeviceKind::Keyboard, &RawInputEvent::key_up(code))
    }

    // ── Keyboard ──────────────────────────────────────────────────────────────

    #[test]
    fn test_key_then_modifier_produces_expected_report() {
        // Arrange
        let mut tracker = DeviceStateTracker::new();

        // Act
        press(&mut tracker, KEY_A).expect("A press reports");
        let out = press(&mut tracker, KEY_LEFTCTRL).expect("ctrl press reports");

        // Assert
        assert_eq!(out.report.as_bytes(), &[0x01, 0x00, 0x04, 0, 0, 0, 0, 0]);
        assert!(out.hotkey_candidate);
    }

    #[test]
    fn test_release_is_not_a_hotkey_candidate() {
        let mut tracker = DeviceStateTracker::new();
        press(&mut tracker, KEY_A);

        let out = release(&mut tracker, KEY_A).expect("release reports");

        assert_eq!(out.report, HidReport::KEYBOARD_RELEASED);
        assert!(!out.hotkey_candidate);
    }

    #[test]
    fn test_keys_are_reported_in_press_order() {
        let mut tracker = DeviceStateTracker::new();
        press(&mut tracker, KEY_S);
        let out = press(&mut tracker, KEY_A).expect("report");

        assert_eq!(&out.report.as_bytes()[2..4], &[0x16, 0x04]);
    }

    #[test]
    fn test_seventh_key_is_dropped_and_its_release_is_ignored() {
        // Arrange – Q W E R T Y held
        let mut tracker = DeviceStateTracker::new();
        for code in 16..=21 {
            press(&mut tracker, code).expect("first six keys report");
        }

        // Act – U is the seventh key
        let seventh = press(&mut tracker, 22);
        let seventh_release = release(&mut tracker, 22);

        // Assert
        assert!(seventh.is_none());
        assert!(seventh_release.is_none());
        assert_eq!(tracker.keyboard().pressed_keys().len(), MAX_PRESSED_KEYS);
    }

    #[test]
    fn test_slot_frees_after_release() {
        let mut tracker = DeviceStateTracker::new();
        for code in 16..=21 {
            press(&mut tracker, code);
        }
        release(&mut tracker, 16);

        let out = press(&mut tracker, 22).expect("freed slot accepts a new key");

        // W E R T Y U – the new key goes to the end
        assert_eq!(
            &out.report.as_bytes()[2..],
            &[0x1A, 0x08, 0x15, 0x17, 0x1C, 0x18]
        );
    }

    #[test]
    fn test_autorepeat_produces_no_report() {
        let mut tracker = DeviceStateTracker::new();
        press(&mut tracker, KEY_A);

        let out = tracker.apply(
            DeviceKind::Keyboard,
            &RawInputEvent::Key { code: KEY_A, action: KeyAction::Repeat },
        );

        assert!(out.is_none());
    }

    #[test]
    fn test_unknown_keycode_is_ignored() {
        let mut tracker = DeviceStateTracker::new();
        // KEY_MACRO1 has no HID equivalent
        assert!(press(&mut tracker, 0x290).is_none());
        assert!(tracker.keyboard().is_empty());
    }

    #[test]
    fn test_suppressed_modifiers_are_hidden_until_released() {
        // Arrange
        let mut tracker = DeviceStateTracker::new();
        press(&mut tracker, KEY_LEFTCTRL);
        tracker.keyboard_mut().suppress_held_modifiers();

        // Act
        let with_shift = press(&mut tracker, KEY_LEFTSHIFT).expect("report");
        release(&mut tracker, KEY_LEFTCTRL);
        press(&mut tracker, KEY_LEFTCTRL);
        let ctrl_again = tracker.keyboard().reported_modifiers();

        // Assert – ctrl hidden while suppressed, visible after a fresh press
        assert_eq!(with_shift.report.as_bytes()[0], ModifierMask::LEFT_SHIFT);
        assert!(ctrl_again.ctrl());
    }

    #[test]
    fn test_keyboard_ignores_sync_events() {
        let mut tracker = DeviceStateTracker::new();
        assert!(tracker
            .apply(DeviceKind::Keyboard, &RawInputEvent::Sync)
            .is_none());
    }

    #[test]
    fn test_reset_keyboard_returns_release_only_when_something_was_held() {
        let mut tracker = DeviceStateTracker::new();
        assert_eq!(tracker.reset(DeviceKind::Keyboard), None);

        press(&mut tracker, KEY_A);
        assert_eq!(
            tracker.reset(DeviceKind::Keyboard),
            Some(HidReport::KEYBOARD_RELEASED)
        );
        assert!(tracker.keyboard().is_empty());
    }

    // ── Mouse ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_mouse_frame_reports_on_sync() {
        // Arrange
        let mut tracker = DeviceStateTracker::new();

        // Act
        let motion_x = tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_X, 5));
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_Y, -3));
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::key_down(BTN_LEFT));
        let frame = tracker
            .apply(DeviceKind::Mouse, &RawInputEvent::Sync)
            .expect("frame report");

        // Assert
        assert!(motion_x.is_none(), "motion is only reported at SYN_REPORT");
        assert_eq!(frame.report.as_bytes(), &[0x01, 0x05, 0xFD, 0x00]);
        assert!(!frame.hotkey_candidate);
    }

    #[test]
    fn test_mouse_deltas_reset_after_each_frame_but_buttons_persist() {
        let mut tracker = DeviceStateTracker::new();
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::key_down(BTN_RIGHT));
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_X, 10));
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::Sync);

        tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_WHEEL, -1));
        let second = tracker
            .apply(DeviceKind::Mouse, &RawInputEvent::Sync)
            .expect("second frame");

        assert_eq!(second.report.as_bytes(), &[0x02, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn test_empty_frame_produces_no_report() {
        let mut tracker = DeviceStateTracker::new();
        assert!(tracker.apply(DeviceKind::Mouse, &RawInputEvent::Sync).is_none());
    }

    #[test]
    fn test_large_motion_is_clamped_not_wrapped() {
        let mut tracker = DeviceStateTracker::new();
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_X, 300));
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_Y, -300));
        let frame = tracker
            .apply(DeviceKind::Mouse, &RawInputEvent::Sync)
            .expect("frame");

        assert_eq!(frame.report.as_bytes()[1] as i8, 127);
        assert_eq!(frame.report.as_bytes()[2] as i8, -127);
    }

    #[test]
    fn test_dropped_events_discard_partial_frame() {
        let mut tracker = DeviceStateTracker::new();
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_X, 4));
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::Dropped);

        assert!(tracker.apply(DeviceKind::Mouse, &RawInputEvent::Sync).is_none());
        assert_eq!(tracker.mouse().pending_motion(), (0, 0));
    }

    #[test]
    fn test_keyboard_drop_releases_held_keys_and_skips_rest_of_frame() {
        // Arrange
        let mut tracker = DeviceStateTracker::new();
        press(&mut tracker, KEY_LEFTCTRL);
        press(&mut tracker, KEY_A);

        // Act
        let dropped = tracker.apply(DeviceKind::Keyboard, &RawInputEvent::Dropped);
        let inside_frame = press(&mut tracker, KEY_S);
        tracker.apply(DeviceKind::Keyboard, &RawInputEvent::Sync);
        let after_frame = press(&mut tracker, KEY_S);

        // Assert
        let dropped = dropped.expect("release report");
        assert_eq!(dropped.report, HidReport::KEYBOARD_RELEASED);
        assert!(!dropped.hotkey_candidate);
        assert!(inside_frame.is_none());
        assert_eq!(
            after_frame.expect("report").report,
            HidReport::Keyboard([0, 0, 0x16, 0, 0, 0, 0, 0])
        );
    }

    #[test]
    fn test_keyboard_drop_with_nothing_held_reports_nothing() {
        let mut tracker = DeviceStateTracker::new();

        assert!(tracker.apply(DeviceKind::Keyboard, &RawInputEvent::Dropped).is_none());
    }

    #[test]
    fn test_unknown_mouse_button_is_ignored() {
        let mut tracker = DeviceStateTracker::new();
        // BTN_TASK
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::key_down(0x117));
        assert!(tracker.apply(DeviceKind::Mouse, &RawInputEvent::Sync).is_none());
    }

    #[test]
    fn test_horizontal_wheel_is_ignored() {
        let mut tracker = DeviceStateTracker::new();
        tracker.apply(DeviceKind::Mouse, &RawInputEvent::relative(REL_HWHEEL, 1));
        assert!(tracker
            .apply(DeviceKind::Mouse, &RawInputEvent::from_kernel(0, SYN_REPORT, 0))
            .is_none());
    }

    #[test]
    fn test_modifier_mask_display_lists_held_modifiers() {
        let mask = ModifierMask(ModifierMask::LEFT_CTRL | ModifierMask::RIGHT_META);
        assert_eq!(mask.to_string(), "LCtrl+RMeta");
        assert_eq!(ModifierMask::default().to_string(), "-");
    }
}
