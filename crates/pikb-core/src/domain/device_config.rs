//! The resolved, immutable device configuration for one process run.
//!
//! Built once at startup from a model preset, an optional config file and
//! command-line overrides.  Nothing changes it afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::input::DeviceKind;

/// Default gadget character file for the keyboard function.
pub const DEFAULT_KEYBOARD_GADGET: &str = "/dev/hidg0";
/// Default gadget character file for the mouse function.
pub const DEFAULT_MOUSE_GADGET: &str = "/dev/hidg1";
/// `bcdDevice` presented to the destination unless overridden.
pub const DEFAULT_SPOOF_REVISION: u16 = 0x0001;

/// Where to find one local input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// evdev character file, usually a stable `/dev/input/by-id/` link.
    pub path: PathBuf,
}

impl fmt::Display for InputDeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} at {}",
            self.vendor_id,
            self.product_id,
            self.path.display()
        )
    }
}

/// USB identity the gadget presents to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpoofIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub revision: u16,
}

impl fmt::Display for SpoofIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "idVendor=0x{:04x} idProduct=0x{:04x} bcdDevice=0x{:04x}",
            self.vendor_id, self.product_id, self.revision
        )
    }
}

/// Everything the forwarder needs to know about devices and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    pub keyboard: InputDeviceConfig,
    pub mouse: InputDeviceConfig,
    /// Presented identity of the keyboard gadget.
    pub spoof: SpoofIdentity,
    pub keyboard_gadget: PathBuf,
    pub mouse_gadget: PathBuf,
    /// Discard reports instead of writing them to the gadget files.
    pub no_usb: bool,
    /// Do not echo reports on the terminal.
    pub hide_events: bool,
    /// Grab the local devices exclusively while capturing.
    pub grab: bool,
}

impl DeviceConfig {
    pub fn input(&self, kind: DeviceKind) -> &InputDeviceConfig {
        match kind {
            DeviceKind::Keyboard => &self.keyboard,
            DeviceKind::Mouse => &self.mouse,
        }
    }

    pub fn gadget_path(&self, kind: DeviceKind) -> &Path {
        match kind {
            DeviceKind::Keyboard => &self.keyboard_gadget,
            DeviceKind::Mouse => &self.mouse_gadget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceConfig {
        DeviceConfig {
            keyboard: InputDeviceConfig {
                vendor_id: 0x04d9,
                product_id: 0x0007,
                path: PathBuf::from("/dev/input/event0"),
            },
            mouse: InputDeviceConfig {
                vendor_id: 0x093a,
                product_id: 0x2510,
                path: PathBuf::from("/dev/input/event1"),
            },
            spoof: SpoofIdentity {
                vendor_id: 0x04d9,
                product_id: 0x0007,
                revision: DEFAULT_SPOOF_REVISION,
            },
            keyboard_gadget: PathBuf::from(DEFAULT_KEYBOARD_GADGET),
            mouse_gadget: PathBuf::from(DEFAULT_MOUSE_GADGET),
            no_usb: false,
            hide_events: false,
            grab: true,
        }
    }

    #[test]
    fn test_lookup_by_kind() {
        let cfg = sample();
        assert_eq!(cfg.input(DeviceKind::Mouse).vendor_id, 0x093a);
        assert_eq!(cfg.gadget_path(DeviceKind::Keyboard), Path::new("/dev/hidg0"));
        assert_eq!(cfg.gadget_path(DeviceKind::Mouse), Path::new("/dev/hidg1"));
    }

    #[test]
    fn test_display_formats_ids_as_hex() {
        let cfg = sample();
        assert_eq!(cfg.keyboard.to_string(), "04d9:0007 at /dev/input/event0");
        assert_eq!(
            cfg.spoof.to_string(),
            "idVendor=0x04d9 idProduct=0x0007 bcdDevice=0x0001"
        );
    }
}
