//! Error types for the durable stores.

use quotesync_fetch::{ParseError, SourceError};
use quotesync_types::{DateWindowError, Symbol};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, updating or persisting stored data.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The remote symbol probe failed. This is not a "not found" answer.
    #[error("Symbol lookup failed for {symbol}: {source}")]
    LookupFailed {
        /// The symbol being validated.
        symbol: Symbol,
        /// The underlying source error.
        source: SourceError,
    },

    /// The remote range fetch failed.
    #[error("Fetch failed for {symbol}: {source}")]
    Fetch {
        /// The symbol being fetched.
        symbol: Symbol,
        /// The underlying source error.
        source: SourceError,
    },

    /// A fetched row could not be coerced to a bar.
    #[error(transparent)]
    MalformedRow(#[from] ParseError),

    /// The fetch window could not be computed.
    #[error(transparent)]
    DateWindow(#[from] DateWindowError),

    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to move a temporary file into place.
    #[error("Failed to replace '{path}': {source}")]
    Replace {
        /// The target path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to take the advisory lock on a file.
    #[error("Failed to lock '{path}': {source}")]
    Lock {
        /// The lock file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a directory.
    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// CSV encoding or decoding failed.
    #[error("CSV error in '{path}': {source}")]
    Csv {
        /// The file being processed.
        path: PathBuf,
        /// The underlying CSV error.
        source: csv_async::Error,
    },

    /// A stored file does not match the expected layout.
    #[error("Corrupt file '{path}' at line {line}: {reason}")]
    CorruptFile {
        /// The offending file.
        path: PathBuf,
        /// One-based line number.
        line: u64,
        /// What was wrong.
        reason: String,
    },
}

impl StoreError {
    /// Returns true if the error only signals an empty fetch window.
    #[must_use]
    pub const fn is_empty_range(&self) -> bool {
        matches!(self, Self::DateWindow(e) if e.is_empty_range())
    }

    /// Returns true if the failure came from the remote source and a later
    /// retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LookupFailed { source, .. } | Self::Fetch { source, .. } => {
                source.is_retryable()
            }
            _ => false,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
