//! Core types for the quotesync historical price synchronizer.
//!
//! This crate provides the fundamental data structures used throughout quotesync:
//!
//! - [`Bar`] - A single daily OHLCV record
//! - [`Series`] - A date-ordered, date-unique sequence of bars
//! - [`Symbol`] - A normalized (lowercase) ticker identifier
//! - [`SymbolRecord`] - A validated symbol with its description
//! - [`FetchWindow`] - The trading-day bounded range requested from a remote source

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quotesync/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod date_window;
mod error;
mod series;
mod symbol;

pub use bar::Bar;
pub use date_window::{
    DATE_FORMAT, DateInput, FetchWindow, default_epoch_start, is_trading_day, last_trading_day,
    to_epoch_seconds,
};
pub use error::{DateWindowError, SymbolError};
pub use series::Series;
pub use symbol::{Symbol, SymbolRecord};
