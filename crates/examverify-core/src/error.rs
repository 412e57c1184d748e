//! Loader error types.
//!
//! Every variant is fatal: a run cannot continue without a complete exam set.
//! They travel inside `anyhow::Error` so callers can downcast and classify.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort loading of the reference or a candidate exam.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid exam JSON.
    #[error("failed to parse exam JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is not a valid TOML answer key.
    #[error("failed to parse answer key TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The exam directory does not exist or is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A question claims a position outside the slot range.
    #[error("{exam}: question position {position} is outside 1..={slot_count}")]
    SlotOutOfRange {
        exam: String,
        position: i64,
        slot_count: u8,
    },

    /// Two questions claim the same position.
    #[error("{exam}: more than one question at position {position}")]
    DuplicateSlot { exam: String, position: u8 },

    /// A question's section letter is not A-D.
    #[error("{exam}: question {position} has unknown section '{section}'")]
    UnknownSection {
        exam: String,
        position: u8,
        section: String,
    },
}

impl LoadError {
    /// Returns `true` if the input itself is malformed (as opposed to unreadable).
    pub fn is_malformed(&self) -> bool {
        !matches!(self, LoadError::Read { .. } | LoadError::NotADirectory(_))
    }
}
