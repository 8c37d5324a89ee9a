//! MacroRecorder: appends every emitted report to a macro file.
//!
//! Each report becomes one JSON line carrying its offset in milliseconds
//! since the recorder was created.  The line is flushed immediately, so a
//! recording cut short by a crash or power loss is still valid up to the
//! last complete line.

use std::io::{self, Write};

use pikb_core::recording::{MacroError, MacroEvent};
use pikb_core::HidReport;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Error type for macro recording.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to write macro record: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Encode(#[from] MacroError),
}

/// Writes reports with their time offsets as macro records.
pub struct MacroRecorder {
    writer: Box<dyn Write + Send>,
    started: Instant,
    events_written: u64,
}

impl MacroRecorder {
    /// Starts a recording; offsets are measured from now.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            started: Instant::now(),
            events_written: 0,
        }
    }

    /// Appends one report and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the record cannot be encoded or written.
    pub fn record(&mut self, report: &HidReport) -> Result<(), RecordError> {
        let offset_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let line = MacroEvent::new(report, offset_ms).to_line()?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        self.events_written += 1;
        debug!(offset_ms, "report recorded");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if flushing fails.
    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn events_written(&self) -> u64 {
        self.events_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// A `Write` target the test can read back.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).expect("utf-8")
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_offsets_since_start() {
        // Arrange
        let buf = SharedBuf::default();
        let mut recorder = MacroRecorder::new(buf.clone());

        // Act
        recorder
            .record(&HidReport::Keyboard([0x01, 0, 0x04, 0, 0, 0, 0, 0]))
            .expect("record");
        tokio::time::advance(Duration::from_millis(120)).await;
        recorder.record(&HidReport::Mouse([0x01, 0x05, 0xFD, 0x00])).expect("record");

        // Assert
        let text = buf.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"source":"keyboard","bytes":"0100040000000000","offset_ms":0}"#,
                r#"{"source":"mouse","bytes":"0105fd00","offset_ms":120}"#,
            ]
        );
        assert_eq!(recorder.events_written(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut recorder = MacroRecorder::new(BrokenPipe);

        let err = recorder.record(&HidReport::MOUSE_RELEASED).unwrap_err();

        assert!(matches!(err, RecordError::Io(_)));
        assert_eq!(recorder.events_written(), 0);
    }
}
