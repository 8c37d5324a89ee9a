//! Macro recording format.
//!
//! A macro is the exact stream of reports a session produced, each with its
//! offset from the start of the recording, stored one JSON record per line.
//! Writing the file and timing the replay live in the application crate;
//! this module only defines and validates the records.

pub mod event;

pub use event::{parse_log, MacroError, MacroEvent};
