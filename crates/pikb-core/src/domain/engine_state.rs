//! Capture/exit state owned by the forwarding loop.
//!
//! ```text
//!            toggle                 exit chord / signal /
//!   Idle  <---------->  Capturing   end of playback / fatal sink error
//!     \                    |
//!      \___________________v
//!                      Draining ---> Stopped
//! ```
//!
//! `Capturing` is the initial phase.  In `Idle` reports are still produced,
//! echoed and recorded, but never written to the destination.

/// Observable phase of the forwarding loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Capturing,
    Draining,
    Stopped,
}

/// Capture and run flags of the forwarding loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    capture_enabled: bool,
    exit_requested: bool,
    stopped: bool,
    toggles: u32,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            capture_enabled: true,
            exit_requested: false,
            stopped: false,
            toggles: 0,
        }
    }
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoopPhase {
        if self.stopped {
            LoopPhase::Stopped
        } else if self.exit_requested {
            LoopPhase::Draining
        } else if self.capture_enabled {
            LoopPhase::Capturing
        } else {
            LoopPhase::Idle
        }
    }

    pub fn capture_enabled(&self) -> bool {
        self.capture_enabled
    }

    /// Returns `true` once exit has been requested (draining or stopped).
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Returns `true` if reports should reach the destination right now.
    pub fn forwarding(&self) -> bool {
        self.phase() == LoopPhase::Capturing
    }

    /// Flips capture on/off and returns the new value.
    ///
    /// Has no effect once exit has been requested.
    pub fn toggle_capture(&mut self) -> bool {
        if !self.exit_requested {
            self.capture_enabled = !self.capture_enabled;
            self.toggles += 1;
        }
        self.capture_enabled
    }

    /// Number of capture toggles so far.
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Marks the drain as complete.  Implies an exit request.
    pub fn finish(&mut self) {
        self.exit_requested = true;
        self.stopped = true;
    }
}
