//! Error types for synchronization.

use quotesync_store::StoreError;
use quotesync_types::{Symbol, SymbolError};
use thiserror::Error;

/// Errors returned by [`SyncEngine`](crate::SyncEngine).
#[derive(Error, Debug)]
pub enum SyncError {
    /// The remote source does not recognize the symbol.
    ///
    /// This is not cached: a later sync probes the source again.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(Symbol),

    /// The requested identifier is not a valid symbol.
    #[error(transparent)]
    InvalidSymbol(#[from] SymbolError),

    /// Reading, fetching or persisting failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Returns true if the error only signals an empty fetch window.
    #[must_use]
    pub const fn is_empty_range(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_empty_range())
    }

    /// Returns true if retrying later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            Self::UnknownSymbol(_) | Self::InvalidSymbol(_) => false,
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
