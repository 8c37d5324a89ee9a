//! Configuration: model presets, the optional TOML file, and resolution into
//! one immutable [`DeviceConfig`].
//!
//! # Where do settings come from? (for beginners)
//!
//! Three layers, each overriding the one before it:
//!
//! 1. **Model preset** – the known vendor/product IDs and `/dev/input/by-id`
//!    paths for the Pi 400, Pi 500 and Pi 500+ keyboards and the official
//!    mouse.
//! 2. **Config file** – an optional TOML file passed with `--config`.
//! 3. **Command line** – flags such as `--keyboard-vid 0x04d9`.
//!
//! ```toml
//! preset = "pi500"
//! log_level = "debug"
//!
//! [keyboard]
//! dev = "/dev/input/event3"
//!
//! [spoof]
//! vid = 0x046d
//! pid = 0xc31c
//!
//! [output]
//! grab = false
//! ```
//!
//! TOML accepts hexadecimal integers (`0x04d9`) directly.  Every field is
//! optional; `#[serde(default)]` fills in whatever is missing.

use std::path::{Path, PathBuf};

use pikb_core::domain::device_config::{
    DEFAULT_KEYBOARD_GADGET, DEFAULT_MOUSE_GADGET, DEFAULT_SPOOF_REVISION,
};
use pikb_core::{DeviceConfig, DeviceKind, InputDeviceConfig, SpoofIdentity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading and resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A resolved path is empty.
    #[error("{field} must not be empty")]
    EmptyPath { field: &'static str },

    /// A USB ID could not be parsed.
    #[error("invalid USB id {0:?}: expected hex (0x04d9) or decimal, at most 0xffff")]
    InvalidId(String),
}

// ── Presets ───────────────────────────────────────────────────────────────────

/// The supported keyboard-computer models.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ModelPreset {
    #[default]
    Pi400,
    Pi500,
    #[value(name = "pi500plus")]
    Pi500Plus,
}

const PIXART_MOUSE_PATH: &str = "/dev/input/by-id/usb-PixArt_USB_Optical_Mouse-event-mouse";
/// The Pi 500+ IDs are not known yet; discovery needs explicit overrides.
const UNKNOWN_DEVICE_PATH: &str = "/dev/input/by-id/PLACEHOLDER";

impl ModelPreset {
    /// Keyboard and mouse defaults for this model.
    pub fn devices(self) -> (InputDeviceConfig, InputDeviceConfig) {
        let device = |vendor_id, product_id, path: &str| InputDeviceConfig {
            vendor_id,
            product_id,
            path: PathBuf::from(path),
        };
        let official_mouse = device(0x093a, 0x2510, PIXART_MOUSE_PATH);
        match self {
            ModelPreset::Pi400 => (
                device(
                    0x04d9,
                    0x0007,
                    "/dev/input/by-id/usb-_Raspberry_Pi_Internal_Keyboard-event-kbd",
                ),
                official_mouse,
            ),
            ModelPreset::Pi500 => (
                device(
                    0x2e8a,
                    0x0010,
                    "/dev/input/by-id/usb-Raspberry_Pi_Ltd_Pi_500_Keyboard-event-kbd",
                ),
                official_mouse,
            ),
            ModelPreset::Pi500Plus => (
                device(0, 0, UNKNOWN_DEVICE_PATH),
                device(0, 0, UNKNOWN_DEVICE_PATH),
            ),
        }
    }
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Per-device overrides.  `None` keeps the value from the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceOverride {
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub dev: Option<PathBuf>,
}

impl DeviceOverride {
    fn merge(&mut self, other: DeviceOverride) {
        self.vid = other.vid.or(self.vid);
        self.pid = other.pid.or(self.pid);
        self.dev = other.dev.or(self.dev.take());
    }

    fn apply(&self, mut base: InputDeviceConfig) -> InputDeviceConfig {
        if let Some(vid) = self.vid {
            base.vendor_id = vid;
        }
        if let Some(pid) = self.pid {
            base.product_id = pid;
        }
        if let Some(dev) = &self.dev {
            base.path = dev.clone();
        }
        base
    }
}

/// Identity the gadget presents; unset fields follow the local keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoofOverride {
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub revision: Option<u16>,
}

/// Gadget character file paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GadgetPaths {
    pub keyboard: Option<PathBuf>,
    pub mouse: Option<PathBuf>,
}

/// Output behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Discard reports instead of writing them to the gadget.
    pub no_usb: bool,
    /// Do not print reports on stdout.
    pub hide_events: bool,
    /// Append the decoded form to each printed report.
    pub annotate: bool,
    /// Grab the local devices while capturing.
    pub grab: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_usb: false,
            hide_events: false,
            annotate: false,
            grab: true,
        }
    }
}

/// Top-level configuration file schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub preset: ModelPreset,
    /// `tracing` level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    pub log_level: String,
    pub keyboard: DeviceOverride,
    pub mouse: DeviceOverride,
    pub spoof: SpoofOverride,
    pub gadget: GadgetPaths,
    pub output: OutputConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preset: ModelPreset::default(),
            log_level: "info".to_string(),
            keyboard: DeviceOverride::default(),
            mouse: DeviceOverride::default(),
            spoof: SpoofOverride::default(),
            gadget: GadgetPaths::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Command-line values layered on top of the file.  Flags only ever turn
/// behaviour on (or grabbing off); they never reset a file setting.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub preset: Option<ModelPreset>,
    pub log_level: Option<String>,
    pub keyboard: DeviceOverride,
    pub mouse: DeviceOverride,
    pub spoof: SpoofOverride,
    pub gadget: GadgetPaths,
    pub no_usb: bool,
    pub hide_events: bool,
    pub annotate: bool,
    pub no_grab: bool,
}

impl AppConfig {
    /// Applies command-line values over this config.
    pub fn apply_cli(&mut self, cli: CliOverrides) {
        if let Some(preset) = cli.preset {
            self.preset = preset;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self.keyboard.merge(cli.keyboard);
        self.mouse.merge(cli.mouse);
        self.spoof.vid = cli.spoof.vid.or(self.spoof.vid);
        self.spoof.pid = cli.spoof.pid.or(self.spoof.pid);
        self.spoof.revision = cli.spoof.revision.or(self.spoof.revision);
        self.gadget.keyboard = cli.gadget.keyboard.or(self.gadget.keyboard.take());
        self.gadget.mouse = cli.gadget.mouse.or(self.gadget.mouse.take());
        self.output.no_usb |= cli.no_usb;
        self.output.hide_events |= cli.hide_events;
        self.output.annotate |= cli.annotate;
        if cli.no_grab {
            self.output.grab = false;
        }
    }

    /// Resolves the preset and overrides into the run's device configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPath`] if a device or gadget path is empty.
    pub fn resolve(&self) -> Result<DeviceConfig, ConfigError> {
        let (keyboard, mouse) = self.preset.devices();
        let keyboard = self.keyboard.apply(keyboard);
        let mouse = self.mouse.apply(mouse);

        let spoof = SpoofIdentity {
            vendor_id: self.spoof.vid.unwrap_or(keyboard.vendor_id),
            product_id: self.spoof.pid.unwrap_or(keyboard.product_id),
            revision: self.spoof.revision.unwrap_or(DEFAULT_SPOOF_REVISION),
        };
        let keyboard_gadget = self
            .gadget
            .keyboard
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_KEYBOARD_GADGET));
        let mouse_gadget = self
            .gadget
            .mouse
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MOUSE_GADGET));

        for (field, path) in [
            ("keyboard device path", &keyboard.path),
            ("mouse device path", &mouse.path),
            ("keyboard gadget path", &keyboard_gadget),
            ("mouse gadget path", &mouse_gadget),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath { field });
            }
        }

        Ok(DeviceConfig {
            keyboard,
            mouse,
            spoof,
            keyboard_gadget,
            mouse_gadget,
            no_usb: self.output.no_usb,
            hide_events: self.output.hide_events,
            grab: self.output.grab,
        })
    }

    /// Whether the resolved input for `kind` has neither IDs nor a real path.
    pub fn is_unconfigured(config: &DeviceConfig, kind: DeviceKind) -> bool {
        let input = config.input(kind);
        input.vendor_id == 0 && input.product_id == 0 && input.path == Path::new(UNKNOWN_DEVICE_PATH)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the config file at `path`, or the defaults when no path is given.
///
/// An explicitly named file that does not exist is an error.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Parses a USB ID given as `0x04d9`, `04d9h`-free hex with prefix, or decimal.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidId`] for anything else or values above `0xffff`.
pub fn parse_id(text: &str) -> Result<u16, ConfigError> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => trimmed.parse::<u16>(),
    };
    parsed.map_err(|_| ConfigError::InvalidId(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_resolves_to_pi400() {
        let resolved = AppConfig::default().resolve().expect("resolve");

        assert_eq!(resolved.keyboard.vendor_id, 0x04d9);
        assert_eq!(resolved.keyboard.product_id, 0x0007);
        assert_eq!(resolved.mouse.vendor_id, 0x093a);
        assert_eq!(resolved.keyboard_gadget, PathBuf::from("/dev/hidg0"));
        assert_eq!(resolved.mouse_gadget, PathBuf::from("/dev/hidg1"));
        assert!(resolved.grab);
        assert!(!resolved.no_usb);
    }

    #[test]
    fn test_spoof_defaults_to_keyboard_identity() {
        let mut cfg = AppConfig::default();
        cfg.preset = ModelPreset::Pi500;

        let resolved = cfg.resolve().expect("resolve");

        assert_eq!(
            resolved.spoof,
            SpoofIdentity {
                vendor_id: 0x2e8a,
                product_id: 0x0010,
                revision: 0x0001,
            }
        );
    }

    #[test]
    fn test_cli_overrides_file_which_overrides_preset() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pikb.toml");
        fs::write(
            &path,
            r#"
preset = "pi500"

[keyboard]
pid = 0x0011
dev = "/dev/input/event7"

[output]
hide_events = true
"#,
        )
        .expect("write");
        let mut cfg = load_config(Some(&path)).expect("load");

        // Act
        cfg.apply_cli(CliOverrides {
            keyboard: DeviceOverride {
                dev: Some(PathBuf::from("/dev/input/event9")),
                ..Default::default()
            },
            no_grab: true,
            ..Default::default()
        });
        let resolved = cfg.resolve().expect("resolve");

        // Assert
        assert_eq!(resolved.keyboard.vendor_id, 0x2e8a, "from preset");
        assert_eq!(resolved.keyboard.product_id, 0x0011, "from file");
        assert_eq!(resolved.keyboard.path, PathBuf::from("/dev/input/event9"), "from cli");
        assert!(resolved.hide_events);
        assert!(!resolved.grab);
    }

    #[test]
    fn test_cli_preset_replaces_file_preset() {
        let mut cfg: AppConfig = toml::from_str(r#"preset = "pi500""#).expect("parse");

        cfg.apply_cli(CliOverrides {
            preset: Some(ModelPreset::Pi400),
            ..Default::default()
        });

        assert_eq!(cfg.resolve().expect("resolve").keyboard.vendor_id, 0x04d9);
    }

    #[test]
    fn test_pi500plus_is_unconfigured_until_overridden() {
        let mut cfg = AppConfig::default();
        cfg.preset = ModelPreset::Pi500Plus;
        let resolved = cfg.resolve().expect("resolve");
        assert!(AppConfig::is_unconfigured(&resolved, DeviceKind::Keyboard));

        cfg.keyboard.vid = Some(0x2e8a);
        let resolved = cfg.resolve().expect("resolve");
        assert!(!AppConfig::is_unconfigured(&resolved, DeviceKind::Keyboard));
        assert!(AppConfig::is_unconfigured(&resolved, DeviceKind::Mouse));
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.gadget.mouse = Some(PathBuf::new());

        let err = cfg.resolve().unwrap_err();

        assert!(matches!(err, ConfigError::EmptyPath { field: "mouse gadget path" }));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "preset = [").expect("write");

        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_named_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/pikb.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_parse_id_accepts_hex_and_decimal() {
        assert_eq!(parse_id("0x04d9").expect("hex"), 0x04d9);
        assert_eq!(parse_id("0X2E8A").expect("hex"), 0x2e8a);
        assert_eq!(parse_id("7").expect("decimal"), 7);
        assert!(parse_id("0x10000").is_err());
        assert!(parse_id("keyboard").is_err());
    }

    #[test]
    fn test_preset_names_match_cli_and_file() {
        use clap::ValueEnum;

        let cli = ModelPreset::from_str("pi500plus", true).expect("cli name");
        let file: AppConfig = toml::from_str(r#"preset = "pi500plus""#).expect("file name");

        assert_eq!(cli, ModelPreset::Pi500Plus);
        assert_eq!(file.preset, ModelPreset::Pi500Plus);
    }
}
