//! ForwardingEngine: the event loop that turns input into HID reports.
//!
//! The engine pulls one [`SourceItem`] at a time from an [`InputSource`],
//! feeds it to the [`DeviceStateTracker`], checks the hotkey chords, and fans
//! each resulting report out to three places:
//!
//! ```text
//!   InputSource ──► tracker ──► hotkey? ──► echo      (always)
//!                                       ├─► recorder  (always, when recording)
//!                                       └─► OutputSink (only while capturing)
//! ```
//!
//! # Architecture
//!
//! The engine depends only on traits (`InputSource`, `OutputSink`,
//! `ReportEcho`) and on pikb-core domain types.  The evdev reader, the gadget
//! writer and the terminal printer are injected at construction time, so the
//! whole loop runs in unit tests with scripted input and mock sinks.
//!
//! # Shutdown (for beginners)
//!
//! [`ForwardingEngine::run`] races the next input item against a `shutdown`
//! future with `tokio::select!`.  Whichever finishes first wins; the loser is
//! simply dropped.  When shutdown wins, or the exit chord is pressed, or a
//! recording runs out, the engine *drains*: it sends all-released reports so
//! nothing stays held on the destination, flushes the recording, and lets the
//! input devices go.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use pikb_core::domain::hotkey::{self, Hotkey};
use pikb_core::{DeviceKind, DeviceStateTracker, EngineState, HidReport, LoopPhase, RawInputEvent};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::application::record_macro::MacroRecorder;

// ── Input seam ────────────────────────────────────────────────────────────────

/// One unit of work delivered by an [`InputSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceItem {
    /// A raw kernel event from a live device.
    Input {
        device: DeviceKind,
        event: RawInputEvent,
    },
    /// A ready-made report from a recording; bypasses the tracker.
    Replay(HidReport),
    /// A live device went away; anything it held must be released.
    Disconnected(DeviceKind),
    /// The source has nothing more to deliver (end of a recording).
    Exhausted,
}

/// Error type for input sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Neither the keyboard nor the mouse could be opened.
    #[error("no input device could be opened (keyboard: {keyboard}; mouse: {mouse})")]
    NoDevices { keyboard: String, mouse: String },

    /// Reading an open device failed for a reason other than unplugging.
    #[error("reading the {device} failed: {source}")]
    Io {
        device: DeviceKind,
        #[source]
        source: io::Error,
    },
}

/// Something that produces input items for the engine.
///
/// `LiveSource` reads evdev devices; `RecordedSource` replays a macro file.
#[async_trait]
pub trait InputSource: Send {
    /// Waits for the next item.
    ///
    /// Must be cancel-safe: the engine may drop the returned future when the
    /// shutdown signal wins the race, and no item may be lost by that.
    async fn next_item(&mut self) -> Result<SourceItem, SourceError>;

    /// Told whenever capture is switched on or off.
    fn set_capture(&mut self, _enabled: bool) {}

    /// Releases the underlying devices.  Called once while draining.
    fn shutdown(&mut self) {}
}

// ── Output seam ───────────────────────────────────────────────────────────────

/// Error type for report delivery.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The gadget character file does not exist or its function is gone.
    #[error("gadget device {path} is absent (is the USB HID gadget configured?): {source}")]
    DeviceAbsent {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No destination host is attached or it has not enumerated the gadget.
    #[error("no destination host connected on {path}")]
    NotConnected { path: PathBuf },

    /// The gadget's buffer is full.
    #[error("gadget device {path} is busy")]
    Busy { path: PathBuf },

    /// The kernel accepted only part of a report.
    #[error("short write to {path}: {written} of {expected} bytes")]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    /// Any other write failure.
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// Returns `true` for failures that are retried with the next report.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SinkError::NotConnected { .. } | SinkError::Busy { .. } | SinkError::ShortWrite { .. }
        )
    }
}

/// Where reports are delivered: the USB gadget, or nowhere in no-USB mode.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send {
    /// Writes one whole report.
    fn send(&mut self, report: &HidReport) -> Result<(), SinkError>;
}

/// Observer that sees every emitted report, e.g. to print it.
pub trait ReportEcho: Send {
    fn report(&mut self, report: &HidReport);
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Error type for the forwarding loop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("input source failed: {0}")]
    Source(#[from] SourceError),
    #[error("report output failed: {0}")]
    Sink(#[from] SinkError),
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Reports produced by input or playback (echoed and recorded).
    pub reports_emitted: u64,
    /// Reports the sink accepted, including drain and toggle releases.
    pub reports_sent: u64,
    /// Reports written to the macro file.
    pub reports_recorded: u64,
    /// Capture toggles.
    pub toggles: u32,
}

/// What woke the loop up.
enum Wake {
    Item(Result<SourceItem, SourceError>),
    Shutdown,
}

/// The forwarding loop with its state and collaborators.
pub struct ForwardingEngine {
    state: EngineState,
    tracker: DeviceStateTracker,
    source: Box<dyn InputSource>,
    sink: Box<dyn OutputSink>,
    echo: Box<dyn ReportEcho>,
    recorder: Option<MacroRecorder>,
    summary: RunSummary,
}

impl ForwardingEngine {
    /// Creates an engine in the `Capturing` phase.
    pub fn new(
        source: Box<dyn InputSource>,
        sink: Box<dyn OutputSink>,
        echo: Box<dyn ReportEcho>,
    ) -> Self {
        Self {
            state: EngineState::new(),
            tracker: DeviceStateTracker::new(),
            source,
            sink,
            echo,
            recorder: None,
            summary: RunSummary::default(),
        }
    }

    /// Records every emitted report to `recorder`.
    pub fn with_recorder(mut self, recorder: MacroRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn phase(&self) -> LoopPhase {
        self.state.phase()
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Runs until the exit chord, `shutdown`, the end of the input, or a
    /// fatal error, then drains.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Source`] if the input source fails and
    /// [`EngineError::Sink`] if the gadget becomes unusable.  The drain runs
    /// in both cases before the error is returned.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<RunSummary, EngineError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(phase = ?self.state.phase(), "forwarding started");
        self.source.set_capture(self.state.capture_enabled());

        let outcome = loop {
            if self.state.exit_requested() {
                break Ok(());
            }

            let wake = tokio::select! {
                item = self.source.next_item() => Wake::Item(item),
                () = &mut shutdown => Wake::Shutdown,
            };

            match wake {
                Wake::Shutdown => {
                    info!("shutdown requested");
                    self.state.request_exit();
                }
                Wake::Item(Ok(item)) => {
                    if let Err(e) = self.handle_item(item) {
                        break Err(e);
                    }
                }
                Wake::Item(Err(e)) => break Err(EngineError::Source(e)),
            }
        };

        if let Err(e) = &outcome {
            error!("stopping after fatal error: {e}");
        }
        self.drain();
        outcome.map(|()| self.summary)
    }

    fn handle_item(&mut self, item: SourceItem) -> Result<(), EngineError> {
        match item {
            SourceItem::Input { device, event } => self.handle_input(device, &event),
            SourceItem::Replay(report) => self.emit(&report),
            SourceItem::Disconnected(device) => {
                warn!(%device, "input device disconnected");
                match self.tracker.reset(device) {
                    Some(release) => self.emit(&release),
                    None => Ok(()),
                }
            }
            SourceItem::Exhausted => {
                info!("input exhausted");
                self.state.request_exit();
                Ok(())
            }
        }
    }

    fn handle_input(&mut self, device: DeviceKind, event: &RawInputEvent) -> Result<(), EngineError> {
        let Some(output) = self.tracker.apply(device, event) else {
            return Ok(());
        };
        if output.hotkey_candidate {
            if let Some(chord) = hotkey::detect(self.tracker.keyboard()) {
                // The chord's own report is swallowed.
                return self.handle_hotkey(chord);
            }
        }
        self.emit(&output.report)
    }

    fn handle_hotkey(&mut self, chord: Hotkey) -> Result<(), EngineError> {
        match chord {
            Hotkey::Exit => {
                info!("exit chord pressed");
                self.state.request_exit();
            }
            Hotkey::ToggleCapture => {
                if self.state.capture_enabled() {
                    for kind in DeviceKind::ALL {
                        self.send(&HidReport::released(kind))?;
                    }
                }
                self.tracker.keyboard_mut().suppress_held_modifiers();
                let enabled = self.state.toggle_capture();
                self.summary.toggles = self.state.toggles();
                self.source.set_capture(enabled);
                info!(
                    capture = enabled,
                    "capture {}",
                    if enabled { "resumed" } else { "paused" }
                );
            }
        }
        Ok(())
    }

    /// Echoes, records, and (while capturing) sends one report.
    fn emit(&mut self, report: &HidReport) -> Result<(), EngineError> {
        self.summary.reports_emitted += 1;
        self.echo.report(report);

        if let Some(recorder) = self.recorder.as_mut() {
            match recorder.record(report) {
                Ok(()) => self.summary.reports_recorded += 1,
                Err(e) => {
                    error!("macro recording stopped: {e}");
                    self.recorder = None;
                }
            }
        }

        if self.state.forwarding() {
            self.send(report)?;
        } else {
            trace!("capture paused, report not sent");
        }
        Ok(())
    }

    /// Sends one report, absorbing transient failures.
    fn send(&mut self, report: &HidReport) -> Result<(), SinkError> {
        match self.sink.send(report) {
            Ok(()) => {
                self.summary.reports_sent += 1;
                Ok(())
            }
            Err(e) if e.is_transient() => {
                trace!(error = %e, "report dropped");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn drain(&mut self) {
        self.state.request_exit();
        debug!(phase = ?self.state.phase(), "draining");

        if self.state.capture_enabled() {
            for kind in DeviceKind::ALL {
                if let Err(e) = self.send(&HidReport::released(kind)) {
                    warn!("could not release {kind} on the destination: {e}");
                }
            }
        }
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.flush() {
                warn!("could not flush the macro file: {e}");
            }
        }
        self.source.shutdown();
        self.state.finish();

        info!(
            emitted = self.summary.reports_emitted,
            sent = self.summary.reports_sent,
            recorded = self.summary.reports_recorded,
            toggles = self.summary.toggles,
            "forwarding stopped"
        );
    }
}
