//! NullSink: discards every report (no-USB mode).
//!
//! Useful to watch the echoed reports, or to record a macro, on a board
//! whose USB port is not set up as a gadget.

use pikb_core::HidReport;
use tracing::trace;

use crate::application::forward_input::{OutputSink, SinkError};

#[derive(Debug, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn send(&mut self, report: &HidReport) -> Result<(), SinkError> {
        trace!(kind = %report.kind(), "report discarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_everything() {
        let mut sink = NullSink;
        assert!(sink.send(&HidReport::KEYBOARD_RELEASED).is_ok());
        assert!(sink.send(&HidReport::Mouse([0x1F, 0x7F, 0x81, 0])).is_ok());
    }
}
