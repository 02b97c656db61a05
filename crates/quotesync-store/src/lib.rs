//! Durable symbol registry and per-symbol time series store for quotesync.
//!
//! This crate owns everything quotesync keeps on disk:
//!
//! - [`StorageLayout`] - The data directory and the paths inside it
//! - [`SymbolRegistry`] - Cache of symbols confirmed to exist remotely
//! - [`TimeSeriesStore`] - Per-symbol daily series with merge semantics
//! - [`Lookup`] - Result of loading a series that may not exist yet
//!
//! Every file is replaced atomically: contents are written to a temporary
//! sibling and renamed over the target, so readers never see a partial file.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quotesync/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod codec;
mod error;
mod layout;
mod lock;
mod registry;
mod series_store;

pub use error::{Result, StoreError};
pub use lock::FileLock;
pub use layout::{REGISTRY_FILE, REGISTRY_LOCK_FILE, SERIES_DIR, StorageLayout};
pub use registry::SymbolRegistry;
pub use series_store::{Lookup, TimeSeriesStore};
