//! GadgetSink: writes reports to the USB HID gadget character files.
//!
//! # What is a HID gadget file? (for beginners)
//!
//! When the board's USB port is configured as a *gadget* (through configfs),
//! the kernel creates one character device per HID function: here
//! `/dev/hidg0` for the keyboard and `/dev/hidg1` for the mouse.  Every
//! `write()` of exactly one report's bytes becomes one interrupt transfer to
//! the destination computer.  The report must go out in a single `write`;
//! a report split over two writes would be read by the host as two broken
//! reports.
//!
//! # Errors
//!
//! The files are opened write-only and non-blocking, so a destination that
//! stops polling can never freeze the loop:
//!
//! | errno                       | meaning                        | handling  |
//! |-----------------------------|--------------------------------|-----------|
//! | `ESHUTDOWN`, `EPIPE`        | host absent or not enumerated  | transient |
//! | `EAGAIN`, `EINTR`           | gadget queue full              | transient |
//! | `ENODEV`, `ENXIO`, `ENOENT` | gadget function removed        | fatal     |
//! | anything else               |                                | fatal     |
//!
//! Transient failures drop the report.  The change between "host connected"
//! and "host not connected" is logged once in each direction, not on every
//! report.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use pikb_core::{DeviceConfig, DeviceKind, HidReport};
use tracing::{debug, info, warn};

use crate::application::forward_input::{OutputSink, SinkError};

/// One open gadget file.
struct GadgetFile {
    path: PathBuf,
    file: File,
}

impl GadgetFile {
    fn open(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| classify_open_error(path, source))?;
        debug!(path = %path.display(), "gadget file opened");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    fn write_report(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        match self.file.write(bytes) {
            Ok(n) if n == bytes.len() => Ok(()),
            Ok(n) => Err(SinkError::ShortWrite {
                path: self.path.clone(),
                written: n,
                expected: bytes.len(),
            }),
            Err(e) => Err(classify_write_error(&self.path, e)),
        }
    }
}

/// Writes keyboard and mouse reports to their gadget files.
pub struct GadgetSink {
    keyboard: GadgetFile,
    mouse: GadgetFile,
    /// Whether the last write reached a host.  `None` until the first write.
    host_connected: Option<bool>,
}

impl GadgetSink {
    /// Opens both gadget files named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::DeviceAbsent`] if a file does not exist (the gadget
    /// is not configured or the `usb_f_hid` module is not loaded), or
    /// [`SinkError::Io`] for other open failures such as missing permissions.
    pub fn open(config: &DeviceConfig) -> Result<Self, SinkError> {
        let keyboard = GadgetFile::open(config.gadget_path(DeviceKind::Keyboard))?;
        let mouse = GadgetFile::open(config.gadget_path(DeviceKind::Mouse))?;
        info!(
            keyboard = %keyboard.path.display(),
            mouse = %mouse.path.display(),
            "USB HID gadget ready"
        );
        Ok(Self {
            keyboard,
            mouse,
            host_connected: None,
        })
    }

    /// Records whether the destination is reachable.  Logs and returns `true`
    /// only when this differs from the previous observation.
    fn note_host(&mut self, connected: bool) -> bool {
        if self.host_connected == Some(connected) {
            return false;
        }
        if connected {
            info!("destination host connected");
        } else {
            warn!("destination host not connected; reports are dropped until it is");
        }
        self.host_connected = Some(connected);
        true
    }

    /// Updates the host state from one write outcome.
    fn observe(&mut self, result: &Result<(), SinkError>) {
        match result {
            Ok(()) => {
                self.note_host(true);
            }
            Err(SinkError::NotConnected { .. }) => {
                self.note_host(false);
            }
            Err(e) if e.is_transient() => debug!("report dropped: {e}"),
            Err(_) => {}
        }
    }
}

impl OutputSink for GadgetSink {
    fn send(&mut self, report: &HidReport) -> Result<(), SinkError> {
        let target = match report.kind() {
            DeviceKind::Keyboard => &mut self.keyboard,
            DeviceKind::Mouse => &mut self.mouse,
        };
        let result = target.write_report(report.as_bytes());
        self.observe(&result);
        result
    }
}

fn is_absent(errno: Option<i32>) -> bool {
    matches!(errno, Some(libc::ENOENT) | Some(libc::ENODEV) | Some(libc::ENXIO))
}

fn classify_open_error(path: &Path, source: io::Error) -> SinkError {
    if is_absent(source.raw_os_error()) {
        SinkError::DeviceAbsent {
            path: path.to_path_buf(),
            source,
        }
    } else {
        SinkError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn classify_write_error(path: &Path, source: io::Error) -> SinkError {
    let path = path.to_path_buf();
    match source.raw_os_error() {
        Some(libc::ESHUTDOWN) | Some(libc::EPIPE) => SinkError::NotConnected { path },
        Some(libc::EAGAIN) | Some(libc::EINTR) => SinkError::Busy { path },
        errno if is_absent(errno) => SinkError::DeviceAbsent { path, source },
        _ => SinkError::Io { path, source },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pikb_core::{InputDeviceConfig, SpoofIdentity};
    use std::fs;

    fn config_with_gadgets(keyboard: PathBuf, mouse: PathBuf) -> DeviceConfig {
        let input = InputDeviceConfig {
            vendor_id: 0,
            product_id: 0,
            path: PathBuf::from("/dev/null"),
        };
        DeviceConfig {
            keyboard: input.clone(),
            mouse: input,
            spoof: SpoofIdentity {
                vendor_id: 0x04d9,
                product_id: 0x0007,
                revision: 0x0001,
            },
            keyboard_gadget: keyboard,
            mouse_gadget: mouse,
            no_usb: false,
            hide_events: true,
            grab: false,
        }
    }

    #[test]
    fn test_write_errors_are_classified() {
        let path = Path::new("/dev/hidg0");
        let err = |code| classify_write_error(path, io::Error::from_raw_os_error(code));

        assert!(matches!(err(libc::ESHUTDOWN), SinkError::NotConnected { .. }));
        assert!(matches!(err(libc::EPIPE), SinkError::NotConnected { .. }));
        assert!(matches!(err(libc::EAGAIN), SinkError::Busy { .. }));
        assert!(matches!(err(libc::ENODEV), SinkError::DeviceAbsent { .. }));
        assert!(matches!(err(libc::EIO), SinkError::Io { .. }));
    }

    fn open_in(dir: &Path) -> GadgetSink {
        let kb_path = dir.join("hidg0");
        let mouse_path = dir.join("hidg1");
        fs::write(&kb_path, b"").expect("create");
        fs::write(&mouse_path, b"").expect("create");
        GadgetSink::open(&config_with_gadgets(kb_path, mouse_path)).expect("open")
    }

    #[test]
    fn test_host_state_is_logged_once_per_transition() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = open_in(dir.path());

        // Act
        let first_down = sink.note_host(false);
        let repeated_down = sink.note_host(false);
        let up = sink.note_host(true);
        let repeated_up = sink.note_host(true);

        // Assert
        assert!(first_down);
        assert!(!repeated_down);
        assert!(up);
        assert!(!repeated_up);
        assert_eq!(sink.host_connected, Some(true));
    }

    #[test]
    fn test_write_outcomes_drive_host_state() {
        // Arrange
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = open_in(dir.path());
        let path = PathBuf::from("/dev/hidg0");
        let not_connected = Err(classify_write_error(
            &path,
            io::Error::from_raw_os_error(libc::ESHUTDOWN),
        ));
        let busy = Err(classify_write_error(&path, io::Error::from_raw_os_error(libc::EAGAIN)));

        // Act / Assert
        sink.observe(&not_connected);
        assert_eq!(sink.host_connected, Some(false));
        sink.observe(&busy);
        assert_eq!(sink.host_connected, Some(false), "a full queue says nothing about the host");
        assert!(!sink.note_host(false), "already logged as disconnected");
        sink.observe(&Ok(()));
        assert_eq!(sink.host_connected, Some(true));
    }

    #[test]
    fn test_missing_gadget_file_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_with_gadgets(dir.path().join("hidg0"), dir.path().join("hidg1"));

        let result = GadgetSink::open(&config);

        assert!(matches!(result, Err(SinkError::DeviceAbsent { .. })));
    }

    #[test]
    fn test_each_report_goes_to_its_own_file_in_one_write() {
        // Arrange: plain files stand in for the character devices.
        let dir = tempfile::tempdir().expect("tempdir");
        let kb_path = dir.path().join("hidg0");
        let mouse_path = dir.path().join("hidg1");
        fs::write(&kb_path, b"").expect("create");
        fs::write(&mouse_path, b"").expect("create");
        let mut sink =
            GadgetSink::open(&config_with_gadgets(kb_path.clone(), mouse_path.clone())).expect("open");

        // Act
        sink.send(&HidReport::Keyboard([0x01, 0, 0x04, 0, 0, 0, 0, 0])).expect("send");
        sink.send(&HidReport::Mouse([0x01, 0x05, 0xFD, 0x00])).expect("send");

        // Assert
        assert_eq!(fs::read(&kb_path).expect("read"), vec![0x01, 0, 0x04, 0, 0, 0, 0, 0]);
        assert_eq!(fs::read(&mouse_path).expect("read"), vec![0x01, 0x05, 0xFD, 0x00]);
        assert_eq!(sink.host_connected, Some(true));
    }
}
