//! Incremental daily price history synchronization.
//!
//! This is a facade crate that re-exports functionality from the quotesync
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use quotesync_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let layout = StorageLayout::with_default_path()?;
//!     let source = Arc::new(YahooSource::with_defaults()?);
//!     let engine = SyncEngine::open(layout, source).await?;
//!
//!     for (symbol, result) in engine.sync_many(["aapl".into(), "msft".into()]).await {
//!         match result {
//!             Ok(report) => println!("{symbol}: {} bars", report.series.len()),
//!             Err(e) => eprintln!("{symbol}: {e}"),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quotesync/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use quotesync_types::*;

// Re-export the remote source layer
#[cfg(feature = "yahoo")]
pub use quotesync_fetch::{
    ClientConfig, HttpClient, ParseError, Probe, RawRow, RemoteSource, SourceError, YahooConfig,
    YahooSource, parse_row, parse_rows,
};

// Re-export durable stores
#[cfg(feature = "sync")]
pub use quotesync_store::{Lookup, StorageLayout, StoreError, SymbolRegistry, TimeSeriesStore};

// Re-export the engine
#[cfg(feature = "sync")]
pub use quotesync_sync::{
    Clock, EngineConfig, FixedClock, SymbolLocks, SyncEngine, SyncError, SyncOutcome, SyncReport,
    SyncState, SystemClock,
};

/// Prelude module for convenient imports.
///
/// ```
/// use quotesync_lib::prelude::*;
/// ```
pub mod prelude {
    pub use quotesync_types::{
        Bar, DateWindowError, FetchWindow, Series, Symbol, SymbolError, SymbolRecord,
        last_trading_day,
    };

    #[cfg(feature = "yahoo")]
    pub use quotesync_fetch::{ClientConfig, Probe, RemoteSource, SourceError, YahooSource};

    #[cfg(feature = "sync")]
    pub use quotesync_store::{Lookup, StorageLayout, StoreError};

    #[cfg(feature = "sync")]
    pub use quotesync_sync::{EngineConfig, SyncEngine, SyncError, SyncOutcome, SyncReport};
}
