//! The remote source capability consumed by the synchronizer.

use async_trait::async_trait;
use quotesync_types::{FetchWindow, Symbol};

use crate::SourceError;

/// One raw table row as text cells.
///
/// Price rows carry seven cells in the order
/// `Date, Open, High, Low, Close, Adj Close, Volume`. Dividend and split
/// annotations carry fewer than three cells.
pub type RawRow = Vec<String>;

/// Result of probing a symbol against the remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The symbol exists.
    Found {
        /// Description of the listed entity.
        about: String,
    },
    /// The source has no profile for the symbol.
    NotFound,
}

impl Probe {
    /// Returns true if the symbol was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// A source of symbol profiles and daily price rows.
///
/// Implementations must bound every request with a timeout and report it as
/// a transport error.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Checks whether the symbol exists and returns its description.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decoding failures. A missing symbol
    /// is [`Probe::NotFound`], not an error.
    async fn validate_symbol(&self, symbol: &Symbol) -> Result<Probe, SourceError>;

    /// Fetches raw daily rows for the symbol within the window.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decoding failures.
    async fn fetch_range(
        &self,
        symbol: &Symbol,
        window: FetchWindow,
    ) -> Result<Vec<RawRow>, SourceError>;
}
