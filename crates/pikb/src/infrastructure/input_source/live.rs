//! LiveSource: reads the local keyboard and mouse through evdev.
//!
//! # How devices are found
//!
//! Each device is opened by its configured path, normally a stable
//! `/dev/input/by-id/...` link.  If that path does not exist, every
//! `/dev/input/event*` node is scanned for one with the configured vendor and
//! product ID that can actually act as the device: a keyboard must report
//! `KEY_A`, a mouse must report `REL_X`.  (A Pi 400 keyboard exposes several
//! event nodes with the same IDs; only one of them types letters.)
//!
//! # Waiting on two devices at once (for beginners)
//!
//! `next_item` uses `tokio::select!` over three futures: the next keyboard
//! event, the next mouse event, and a one-second reconnect tick.  A device
//! that is not open contributes a future that never completes, so the loop
//! simply waits on whatever is available.  When a read fails because the
//! device was unplugged, the stream is dropped and the engine is told with
//! `SourceItem::Disconnected`; the tick then retries opening it.
//!
//! # Grabbing
//!
//! While capture is on (and grabbing is enabled) both devices are grabbed
//! with `EVIOCGRAB`, so keystrokes meant for the destination do not also
//! reach the Pi's own console or desktop.  They are released while idle.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use evdev::{Device, EventStream, InputEvent, Key, RelativeAxisType};
use pikb_core::{DeviceConfig, DeviceKind, InputDeviceConfig, RawInputEvent};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::application::forward_input::{InputSource, SourceError, SourceItem};

/// How often a missing device is looked for again.
const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

// ── Device slot ───────────────────────────────────────────────────────────────

/// One configured device and its open stream, if any.
struct DeviceSlot {
    kind: DeviceKind,
    config: InputDeviceConfig,
    stream: Option<EventStream>,
    grabbed: bool,
    /// Set once the device being unavailable has been logged at `warn`.
    missing_logged: bool,
}

impl DeviceSlot {
    fn new(kind: DeviceKind, config: InputDeviceConfig) -> Self {
        Self {
            kind,
            config,
            stream: None,
            grabbed: false,
            missing_logged: false,
        }
    }

    /// Opens the device if it is not open.  Grabs it when `grab` is set.
    fn ensure_open(&mut self, grab: bool) -> io::Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        match open_device(self.kind, &self.config) {
            Ok((path, device)) => {
                info!(
                    device = %self.kind,
                    path = %path.display(),
                    name = device.name().unwrap_or("?"),
                    "input device opened"
                );
                self.stream = Some(device.into_event_stream()?);
                self.grabbed = false;
                self.missing_logged = false;
                self.set_grab(grab);
                Ok(())
            }
            Err(e) => {
                if self.missing_logged {
                    trace!(device = %self.kind, "still unavailable: {e}");
                } else {
                    warn!(device = %self.kind, config = %self.config, "input device unavailable: {e}");
                    self.missing_logged = true;
                }
                Err(e)
            }
        }
    }

    fn set_grab(&mut self, on: bool) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if self.grabbed == on {
            return;
        }
        let device = stream.device_mut();
        let result = if on { device.grab() } else { device.ungrab() };
        match result {
            Ok(()) => {
                self.grabbed = on;
                debug!(device = %self.kind, grabbed = on, "grab changed");
            }
            Err(e) => warn!(
                device = %self.kind,
                "could not {} device: {e}",
                if on { "grab" } else { "release" }
            ),
        }
    }

    /// Forgets the stream after the device went away.
    fn lost(&mut self) {
        self.stream = None;
        self.grabbed = false;
        self.missing_logged = true;
    }

    fn close(&mut self) {
        self.set_grab(false);
        self.stream = None;
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

/// Reads the keyboard and mouse configured in a [`DeviceConfig`].
pub struct LiveSource {
    keyboard: DeviceSlot,
    mouse: DeviceSlot,
    reconnect: Interval,
    /// Grab devices while capturing.
    grab: bool,
    capturing: bool,
}

impl LiveSource {
    /// Opens both devices.  One of them missing is tolerated; it is retried
    /// every second.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoDevices`] if neither device can be opened.
    pub fn open(config: &DeviceConfig) -> Result<Self, SourceError> {
        let mut keyboard = DeviceSlot::new(DeviceKind::Keyboard, config.keyboard.clone());
        let mut mouse = DeviceSlot::new(DeviceKind::Mouse, config.mouse.clone());

        let keyboard_result = keyboard.ensure_open(false);
        let mouse_result = mouse.ensure_open(false);
        if let (Err(kb), Err(ms)) = (&keyboard_result, &mouse_result) {
            return Err(SourceError::NoDevices {
                keyboard: kb.to_string(),
                mouse: ms.to_string(),
            });
        }

        let mut reconnect = interval_at(Instant::now() + RECONNECT_INTERVAL, RECONNECT_INTERVAL);
        reconnect.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self {
            keyboard,
            mouse,
            reconnect,
            grab: config.grab,
            capturing: false,
        })
    }

    fn slot_mut(&mut self, kind: DeviceKind) -> &mut DeviceSlot {
        match kind {
            DeviceKind::Keyboard => &mut self.keyboard,
            DeviceKind::Mouse => &mut self.mouse,
        }
    }

    fn reconnect_missing(&mut self) {
        let grab = self.grab && self.capturing;
        for slot in [&mut self.keyboard, &mut self.mouse] {
            // Failures are logged inside and retried on the next tick.
            let _ = slot.ensure_open(grab);
        }
    }
}

#[async_trait]
impl InputSource for LiveSource {
    async fn next_item(&mut self) -> Result<SourceItem, SourceError> {
        loop {
            let (kind, result) = tokio::select! {
                r = read_event(&mut self.keyboard.stream) => (DeviceKind::Keyboard, r),
                r = read_event(&mut self.mouse.stream) => (DeviceKind::Mouse, r),
                _ = self.reconnect.tick() => {
                    self.reconnect_missing();
                    continue;
                }
            };

            match result {
                Ok(event) => {
                    let event = RawInputEvent::from_kernel(
                        event.event_type().0,
                        event.code(),
                        event.value(),
                    );
                    if let RawInputEvent::Other { event_type, code } = event {
                        trace!(device = %kind, event_type, code, "event ignored");
                        continue;
                    }
                    return Ok(SourceItem::Input { device: kind, event });
                }
                Err(e) if is_disconnect(&e) => {
                    warn!(device = %kind, "input device disconnected: {e}");
                    self.slot_mut(kind).lost();
                    return Ok(SourceItem::Disconnected(kind));
                }
                Err(e) => return Err(SourceError::Io { device: kind, source: e }),
            }
        }
    }

    fn set_capture(&mut self, enabled: bool) {
        self.capturing = enabled;
        if self.grab {
            self.keyboard.set_grab(enabled);
            self.mouse.set_grab(enabled);
        }
    }

    fn shutdown(&mut self) {
        self.keyboard.close();
        self.mouse.close();
        debug!("input devices released");
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Reads the next event, or waits forever if the device is not open.
async fn read_event(stream: &mut Option<EventStream>) -> io::Result<InputEvent> {
    match stream {
        Some(stream) => stream.next_event().await,
        None => std::future::pending().await,
    }
}

fn is_disconnect(error: &io::Error) -> bool {
    matches!(error.raw_os_error(), Some(libc::ENODEV) | Some(libc::ENOENT))
}

/// Opens the configured path, falling back to a scan by vendor/product ID.
fn open_device(kind: DeviceKind, config: &InputDeviceConfig) -> io::Result<(PathBuf, Device)> {
    match Device::open(&config.path) {
        Ok(device) => return Ok((config.path.clone(), device)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(device = %kind, path = %config.path.display(), "path missing, scanning by id");
        }
        Err(e) => return Err(e),
    }

    if config.vendor_id == 0 && config.product_id == 0 {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found and no vendor/product id configured", config.path.display()),
        ));
    }

    evdev::enumerate()
        .find(|(_, device)| {
            let id = device.input_id();
            id.vendor() == config.vendor_id
                && id.product() == config.product_id
                && has_capability(kind, device)
        })
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "no {kind} with id {:04x}:{:04x} found",
                    config.vendor_id, config.product_id
                ),
            )
        })
}

/// Checks that a device can act as `kind`.
fn has_capability(kind: DeviceKind, device: &Device) -> bool {
    match kind {
        DeviceKind::Keyboard => device
            .supported_keys()
            .map_or(false, |keys| keys.contains(Key::KEY_A)),
        DeviceKind::Mouse => device
            .supported_relative_axes()
            .map_or(false, |axes| axes.contains(RelativeAxisType::REL_X)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unplug_errors_count_as_disconnect() {
        assert!(is_disconnect(&io::Error::from_raw_os_error(libc::ENODEV)));
        assert!(!is_disconnect(&io::Error::from_raw_os_error(libc::EINVAL)));
        assert!(!is_disconnect(&io::Error::new(io::ErrorKind::Other, "x")));
    }

    #[test]
    fn test_unconfigured_missing_device_is_not_scanned() {
        let config = InputDeviceConfig {
            vendor_id: 0,
            product_id: 0,
            path: PathBuf::from("/nonexistent/pikb-test-device"),
        };

        let err = open_device(DeviceKind::Mouse, &config).err().expect("expected open_device to fail");

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("no vendor/product id configured"));
    }
}
