//! Scripted input source for tests.
//!
//! # Why a scripted source?
//!
//! The real `LiveSource` needs physical evdev devices and root access.  The
//! `ScriptedSource` replays a fixed list of steps instead: yield an item,
//! sleep for a while, or fail.  Sleeps use tokio time, so tests running with
//! a paused clock finish instantly while still seeing the right offsets.
//!
//! # Usage in tests
//!
//! ```ignore
//! let source = ScriptedSource::new()
//!     .key_down(KEY_A)
//!     .pause(Duration::from_millis(40))
//!     .key_up(KEY_A);
//! let log = source.log();
//!
//! engine_with(source).run(std::future::pending()).await?;
//!
//! assert_eq!(log.lock().unwrap().shutdown_calls, 1);
//! ```
//!
//! When the script runs out the source yields `SourceItem::Exhausted`,
//! unless `pending_at_end` was set, in which case it waits forever like an
//! idle keyboard.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pikb_core::{DeviceKind, RawInputEvent};

use crate::application::forward_input::{InputSource, SourceError, SourceItem};

/// One scripted step.
#[derive(Debug)]
pub enum ScriptStep {
    Yield(SourceItem),
    Sleep(Duration),
    Fail(SourceError),
}

/// What the engine told the source, for assertions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptLog {
    /// Every `set_capture` argument in call order.
    pub capture_changes: Vec<bool>,
    pub shutdown_calls: u32,
}

/// An input source driven by a fixed script.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: VecDeque<ScriptStep>,
    pending_at_end: bool,
    log: Arc<Mutex<ScriptLog>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, item: SourceItem) -> Self {
        self.steps.push_back(ScriptStep::Yield(item));
        self
    }

    pub fn input(self, device: DeviceKind, event: RawInputEvent) -> Self {
        self.push(SourceItem::Input { device, event })
    }

    pub fn key_down(self, code: u16) -> Self {
        self.input(DeviceKind::Keyboard, RawInputEvent::key_down(code))
    }

    pub fn key_up(self, code: u16) -> Self {
        self.input(DeviceKind::Keyboard, RawInputEvent::key_up(code))
    }

    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push_back(ScriptStep::Sleep(duration));
        self
    }

    pub fn fail(mut self, error: SourceError) -> Self {
        self.steps.push_back(ScriptStep::Fail(error));
        self
    }

    /// Wait forever instead of yielding `Exhausted` when the script ends.
    pub fn pending_at_end(mut self) -> Self {
        self.pending_at_end = true;
        self
    }

    /// Shared view of the calls the engine made.
    pub fn log(&self) -> Arc<Mutex<ScriptLog>> {
        Arc::clone(&self.log)
    }

    fn update_log(&self, f: impl FnOnce(&mut ScriptLog)) {
        let mut log = self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut log);
    }
}

#[async_trait]
impl InputSource for ScriptedSource {
    async fn next_item(&mut self) -> Result<SourceItem, SourceError> {
        loop {
            match self.steps.pop_front() {
                Some(ScriptStep::Yield(item)) => return Ok(item),
                Some(ScriptStep::Sleep(duration)) => tokio::time::sleep(duration).await,
                Some(ScriptStep::Fail(error)) => return Err(error),
                None if self.pending_at_end => std::future::pending::<()>().await,
                None => return Ok(SourceItem::Exhausted),
            }
        }
    }

    fn set_capture(&mut self, enabled: bool) {
        self.update_log(|log| log.capture_changes.push(enabled));
    }

    fn shutdown(&mut self) {
        self.update_log(|log| log.shutdown_calls += 1);
    }
}
