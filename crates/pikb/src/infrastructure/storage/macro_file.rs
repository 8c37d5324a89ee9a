//! Reading and creating macro files.
//!
//! A macro file is loaded and validated completely before playback starts,
//! so a broken line near the end is reported before anything is sent to the
//! destination.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use pikb_core::recording::{parse_log, MacroError, MacroEvent};
use thiserror::Error;
use tracing::info;

/// Error type for macro file operations.
#[derive(Debug, Error)]
pub enum MacroFileError {
    #[error("failed to read macro file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create macro file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid macro file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: MacroError,
    },
}

/// Reads and validates every record of a macro file.
///
/// # Errors
///
/// Returns [`MacroFileError::Read`] if the file cannot be read and
/// [`MacroFileError::Invalid`] for the first bad line.
pub fn load_macro(path: &Path) -> Result<Vec<MacroEvent>, MacroFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| MacroFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let events = parse_log(&text).map_err(|source| MacroFileError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = events.len(), "macro file loaded");
    Ok(events)
}

/// Creates (or truncates) a macro file for recording.
///
/// # Errors
///
/// Returns [`MacroFileError::Create`] if the file cannot be created.
pub fn open_recording(path: &Path) -> Result<BufWriter<File>, MacroFileError> {
    let file = File::create(path).map_err(|source| MacroFileError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "recording macro");
    Ok(BufWriter::new(file))
}
