//! RecordedSource: plays a macro file back as an input source.
//!
//! The reports go straight to the engine as [`SourceItem::Replay`]; they do
//! not pass through the device state tracker, so the destination receives
//! exactly the bytes that were recorded.
//!
//! # Timing
//!
//! Before each report the player waits for the gap between its offset and
//! the previous report's offset (the first report waits for its own offset).
//! The gap is measured from when the previous report was handed over, so
//! time the engine spends writing, echoing or recording a report never
//! shortens the pause that follows it.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use pikb_core::recording::{MacroError, MacroEvent};
use pikb_core::HidReport;
use tracing::{debug, info};

use crate::application::forward_input::{InputSource, SourceError, SourceItem};

/// Replays validated macro records with their original timing.
pub struct RecordedSource {
    pending: VecDeque<(u64, HidReport)>,
    /// Offset of the last report handed out.
    previous_offset_ms: u64,
}

impl RecordedSource {
    /// Builds a player from already parsed records.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::InvalidRecord`] if a record's bytes do not form
    /// a report of its source.
    pub fn new(events: Vec<MacroEvent>) -> Result<Self, MacroError> {
        let pending = events
            .iter()
            .enumerate()
            .map(|(idx, event)| {
                event
                    .to_report()
                    .map(|report| (event.offset_ms, report))
                    .map_err(|source_error| MacroError::InvalidRecord {
                        record: idx + 1,
                        source_error,
                    })
            })
            .collect::<Result<VecDeque<_>, _>>()?;
        info!(reports = pending.len(), "macro loaded");
        Ok(Self {
            pending,
            previous_offset_ms: 0,
        })
    }

    /// Reports not yet played.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl InputSource for RecordedSource {
    async fn next_item(&mut self) -> Result<SourceItem, SourceError> {
        let Some(&(offset_ms, _)) = self.pending.front() else {
            return Ok(SourceItem::Exhausted);
        };

        let gap_ms = offset_ms.saturating_sub(self.previous_offset_ms);
        if gap_ms > 0 {
            tokio::time::sleep(Duration::from_millis(gap_ms)).await;
        }

        // Popped only after the sleep so a cancelled wait loses nothing.
        match self.pending.pop_front() {
            Some((offset_ms, report)) => {
                debug!(offset_ms, gap_ms, "replaying report");
                self.previous_offset_ms = offset_ms;
                Ok(SourceItem::Replay(report))
            }
            None => Ok(SourceItem::Exhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pikb_core::DeviceKind;
    use tokio::time::Instant;

    fn event(source: DeviceKind, bytes: &[u8], offset_ms: u64) -> MacroEvent {
        MacroEvent {
            source,
            bytes: bytes.to_vec(),
            offset_ms,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_are_released_at_their_offsets() {
        // Arrange
        let mut source = RecordedSource::new(vec![
            event(DeviceKind::Mouse, &[0, 1, 0, 0], 50),
            event(DeviceKind::Keyboard, &[0, 0, 4, 0, 0, 0, 0, 0], 80),
        ])
        .expect("valid macro");
        let start = Instant::now();

        // Act
        let first = source.next_item().await.expect("item");
        let first_at = start.elapsed();
        let second = source.next_item().await.expect("item");
        let second_at = start.elapsed();
        let end = source.next_item().await.expect("item");

        // Assert
        assert_eq!(first, SourceItem::Replay(HidReport::Mouse([0, 1, 0, 0])));
        assert!(first_at >= Duration::from_millis(50) && first_at < Duration::from_millis(52));
        assert_eq!(
            second,
            SourceItem::Replay(HidReport::Keyboard([0, 0, 4, 0, 0, 0, 0, 0]))
        );
        assert!(second_at >= Duration::from_millis(80) && second_at < Duration::from_millis(82));
        assert_eq!(end, SourceItem::Exhausted);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gap_is_measured_from_the_previous_report() {
        // Arrange
        let mut source = RecordedSource::new(vec![
            event(DeviceKind::Mouse, &[0, 1, 0, 0], 0),
            event(DeviceKind::Mouse, &[0, 2, 0, 0], 30),
        ])
        .expect("valid macro");
        source.next_item().await.expect("item");

        // Act: the consumer spends 100 ms on the first report.
        tokio::time::advance(Duration::from_millis(100)).await;
        let before_second = Instant::now();
        let second = source.next_item().await.expect("item");
        let gap = before_second.elapsed();

        // Assert
        assert_eq!(second, SourceItem::Replay(HidReport::Mouse([0, 2, 0, 0])));
        assert!(gap >= Duration::from_millis(30) && gap < Duration::from_millis(32));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_keeps_the_report() {
        let mut source =
            RecordedSource::new(vec![event(DeviceKind::Mouse, &[0, 0, 0, 1], 1_000)]).expect("valid");

        let timed_out = tokio::time::timeout(Duration::from_millis(10), source.next_item()).await;

        assert!(timed_out.is_err());
        assert_eq!(source.remaining(), 1);
        let item = source.next_item().await.expect("item");
        assert_eq!(item, SourceItem::Replay(HidReport::Mouse([0, 0, 0, 1])));
    }

    #[test]
    fn test_wrong_length_record_is_rejected() {
        let result = RecordedSource::new(vec![
            event(DeviceKind::Mouse, &[0, 0, 0, 0], 0),
            event(DeviceKind::Keyboard, &[0, 0, 0, 0], 5),
        ]);

        let err = result.err().expect("rejected");
        assert!(matches!(err, MacroError::InvalidRecord { record: 2, .. }));
        assert!(err.to_string().starts_with("record 2:"));
    }
}
