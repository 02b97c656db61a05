//! Per-symbol synchronization engine for quotesync.
//!
//! - [`SyncEngine`] - Validates, downloads and incrementally updates symbols
//! - [`SyncState`] - States a single sync passes through
//! - [`SymbolLocks`] - Per-symbol mutual exclusion
//! - [`Clock`] - Source of "today"
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quotesync_fetch::YahooSource;
//! use quotesync_store::StorageLayout;
//! use quotesync_sync::SyncEngine;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = StorageLayout::with_default_path()?;
//! let engine = SyncEngine::open(layout, Arc::new(YahooSource::with_defaults()?)).await?;
//!
//! let report = engine.sync("AAPL").await?;
//! println!("{}: {} bars", report.symbol, report.series.len());
//! # Ok(())
//! # }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quotesync/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod clock;
mod engine;
mod error;
mod locks;
mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{EngineConfig, SyncEngine, SyncOutcome, SyncReport};
pub use error::{Result, SyncError};
pub use locks::{SymbolGuard, SymbolLocks};
pub use state::SyncState;
