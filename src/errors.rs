/*!
 * Error types for the srtkit library and command line tool.
 *
 * The subtitle core reports structured `SubtitleError`s; the outer layers
 * (file handling, controller, CLI) work with `anyhow` and fold everything
 * into an `AppError` at the process boundary.
 */

use thiserror::Error;

use crate::subtitle::Timecode;

/// Errors raised by the subtitle core (timecodes, entries, streams, parser)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// Malformed or out-of-range timecode, or arithmetic going negative
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    /// Entry construction or shift violating its timing or text rules
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Strict-mode insertion colliding with an existing entry
    #[error("Entry {start} --> {end} overlaps the entry at position {position}")]
    OverlapError {
        /// Start of the rejected entry
        start: Timecode,
        /// End of the rejected entry
        end: Timecode,
        /// Stream position of the entry it collides with
        position: usize,
    },

    /// Removal or access addressing a non-existent position
    #[error("Position {index} is out of range for a stream of {len} entries")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of entries in the stream
        len: usize,
    },

    /// Malformed SubRip input
    #[error("Parse error at line {line_number}: {reason}")]
    ParseError {
        /// Human-readable reason
        reason: String,
        /// 1-based line of the offending input
        line_number: usize,
    },
}

impl SubtitleError {
    pub(crate) fn parse(reason: impl Into<String>, line_number: usize) -> Self {
        Self::ParseError {
            reason: reason.into(),
            line_number,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the subtitle core
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Subtitle(SubtitleError::ParseError { .. }) => 65,
            Self::Subtitle(_) => 2,
            Self::Config(_) => 78,
            Self::File(_) => 74,
            Self::Unknown(_) => 1,
        }
    }
}

// Keep the subtitle error when it is somewhere in the chain so callers can
// still match on it.
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        if let Some(subtitle_error) = error.chain().find_map(|e| e.downcast_ref::<SubtitleError>()) {
            return Self::Subtitle(subtitle_error.clone());
        }
        if error.chain().any(|e| e.is::<std::io::Error>()) {
            return Self::File(format!("{:#}", error));
        }
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
