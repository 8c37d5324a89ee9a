//! Recording output sink for tests.
//!
//! # Why a recording sink?
//!
//! The real `GadgetSink` writes to `/dev/hidg*`, which only exist on a board
//! configured as a USB gadget.  The `RecordingSink` keeps every report it is
//! given, together with the tokio time it arrived, in a shared log that the
//! test keeps a handle to after the sink has been moved into the engine.
//!
//! # Usage in tests
//!
//! ```ignore
//! let sink = RecordingSink::new();
//! let sent = sink.sent();
//!
//! engine_with(Box::new(sink)).run(shutdown).await?;
//!
//! assert_eq!(sent.reports()[0].as_bytes(), &[0x01, 0x05, 0xFD, 0x00]);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use pikb_core::HidReport;
use tokio::time::Instant;

use crate::application::forward_input::{OutputSink, SinkError};

/// One delivered report and when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentReport {
    pub report: HidReport,
    pub at: Instant,
}

/// Shared view of everything a [`RecordingSink`] received.
#[derive(Debug, Clone, Default)]
pub struct SentLog(Arc<Mutex<Vec<SentReport>>>);

impl SentLog {
    fn lock(&self) -> MutexGuard<'_, Vec<SentReport>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<SentReport> {
        self.lock().clone()
    }

    pub fn reports(&self) -> Vec<HidReport> {
        self.lock().iter().map(|s| s.report).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// An output sink that accepts every report and logs it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: SentLog,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> SentLog {
        self.sent.clone()
    }
}

impl OutputSink for RecordingSink {
    fn send(&mut self, report: &HidReport) -> Result<(), SinkError> {
        self.sent.lock().push(SentReport {
            report: *report,
            at: Instant::now(),
        });
        Ok(())
    }
}
