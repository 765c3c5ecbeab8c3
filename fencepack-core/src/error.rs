//! Structured error types for fencepack-core.
//!
//! The first two variants are the "nothing to download" outcomes and carry the
//! exact text shown to the user. Everything else is an archive failure from the
//! user's point of view; the binary crate wraps these in `anyhow` at its edge.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fencepack-core operations
#[derive(Error, Debug)]
pub enum FencepackError {
    /// The transcript holds no assistant-authored message
    #[error("No module has been generated yet.")]
    NoAssistantMessage,

    /// The latest assistant message has no `file="..."` annotated block
    #[error("No module code available for download.")]
    NoExtractableFiles,

    /// Zip serialization failed
    #[error("Archive serialization failed: {source}")]
    Archive {
        #[from]
        source: zip::result::ZipError,
    },

    /// Writing the archive (or reading an input) failed
    #[error("I/O error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// JSON parsing failed while loading a transcript
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// Transcript has an unsupported shape
    #[error("Failed to parse transcript: {reason}")]
    Transcript { reason: String },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for fencepack-core operations
pub type Result<T> = std::result::Result<T, FencepackError>;

impl FencepackError {
    /// Create an I/O error tied to a path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a transcript shape error
    pub fn transcript(reason: impl Into<String>) -> Self {
        Self::Transcript {
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// True for failures that happen while serializing or delivering an archive.
    pub fn is_archive_failure(&self) -> bool {
        matches!(self, Self::Archive { .. } | Self::Io { .. })
    }
}
