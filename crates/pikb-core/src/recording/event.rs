//! The macro record format: one JSON object per line.
//!
//! ```text
//! {"source":"keyboard","bytes":"0100040000000000","offset_ms":0}
//! {"source":"mouse","bytes":"0105fd00","offset_ms":16}
//! ```
//!
//! `bytes` is written as lowercase hex.  When reading, a hex string (spaces
//! allowed) or a JSON array of byte values is accepted.  `offset_ms` is the
//! time since recording started and never decreases from one line to the
//! next.
//!
//! A line that does not parse, has the wrong byte count for its source, or
//! goes back in time is a hard error carrying its 1-based line number:
//! replaying an approximation of a recording is worse than not replaying it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::input::DeviceKind;
use crate::report::codec::{HidReport, ReportError};

/// Errors in macro records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacroError {
    /// The line is not a valid JSON record.
    #[error("line {line}: malformed macro record: {reason}")]
    Malformed { line: usize, reason: String },

    /// The bytes do not form a report of the declared source.
    #[error("line {line}: {source_error}")]
    InvalidReport {
        line: usize,
        source_error: ReportError,
    },

    /// A parsed record's bytes do not form a report of its source.
    /// `record` counts records (1-based), not file lines.
    #[error("record {record}: {source_error}")]
    InvalidRecord {
        record: usize,
        source_error: ReportError,
    },

    /// The offset is earlier than the previous record's offset.
    #[error("line {line}: offset {offset_ms} ms is earlier than previous offset {previous_ms} ms")]
    OutOfOrder {
        line: usize,
        offset_ms: u64,
        previous_ms: u64,
    },

    /// A record could not be serialized.
    #[error("failed to serialize macro record: {0}")]
    Serialize(String),
}

/// One recorded report with its time offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroEvent {
    pub source: DeviceKind,
    #[serde(with = "report_bytes")]
    pub bytes: Vec<u8>,
    pub offset_ms: u64,
}

impl MacroEvent {
    pub fn new(report: &HidReport, offset_ms: u64) -> Self {
        Self {
            source: report.kind(),
            bytes: report.as_bytes().to_vec(),
            offset_ms,
        }
    }

    /// Rebuilds the report, checking the byte count for the source.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidLength`] for a wrong byte count.
    pub fn to_report(&self) -> Result<HidReport, ReportError> {
        HidReport::from_bytes(self.source, &self.bytes)
    }

    /// Serializes the record as one line of JSON (without the newline).
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::Serialize`] if serialization fails.
    pub fn to_line(&self) -> Result<String, MacroError> {
        serde_json::to_string(self).map_err(|e| MacroError::Serialize(e.to_string()))
    }

    /// Parses and validates one line.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::Malformed`] for invalid JSON or hex and
    /// [`MacroError::InvalidReport`] for a wrong byte count.
    pub fn parse_line(text: &str, line: usize) -> Result<Self, MacroError> {
        let event: MacroEvent = serde_json::from_str(text).map_err(|e| MacroError::Malformed {
            line,
            reason: e.to_string(),
        })?;
        event
            .to_report()
            .map_err(|source_error| MacroError::InvalidReport { line, source_error })?;
        Ok(event)
    }
}

/// Parses a whole macro log, validating every line and the offset order.
///
/// Blank lines are skipped; anything else that fails to parse stops the parse.
///
/// # Errors
///
/// Returns the first [`MacroError`] encountered.
pub fn parse_log(text: &str) -> Result<Vec<MacroEvent>, MacroError> {
    let mut events = Vec::new();
    let mut previous_ms = 0u64;
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let event = MacroEvent::parse_line(raw, line)?;
        if event.offset_ms < previous_ms {
            return Err(MacroError::OutOfOrder {
                line,
                offset_ms: event.offset_ms,
                previous_ms,
            });
        }
        previous_ms = event.offset_ms;
        events.push(event);
    }
    Ok(events)
}

/// Serde adapter: hex string out, hex string or byte array in.
mod report_bytes {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Hex(String),
        Array(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Hex(text) => {
                let compact: String = text.split_whitespace().collect();
                hex::decode(compact).map_err(D::Error::custom)
            }
            Repr::Array(bytes) => Ok(bytes),
        }
    }
}
