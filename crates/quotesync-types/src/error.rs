//! Error types for quotesync core types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by fetch-window date arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateWindowError {
    /// The input is neither a Unix timestamp nor a `YYYY-MM-DD` date.
    #[error("Invalid date format: {input:?} (expected YYYY-MM-DD or a Unix timestamp)")]
    InvalidDateFormat {
        /// The rejected input.
        input: String,
    },

    /// The start bound is not strictly before the trading-day end bound.
    #[error("Empty fetch window: {start} to {end}")]
    EmptyRange {
        /// The requested start date.
        start: NaiveDate,
        /// The end date after trimming to the last trading day.
        end: NaiveDate,
    },
}

impl DateWindowError {
    /// Returns true if this error only signals that there is nothing to fetch.
    #[must_use]
    pub const fn is_empty_range(&self) -> bool {
        matches!(self, Self::EmptyRange { .. })
    }
}

/// Errors produced when normalizing a symbol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// The symbol is empty after trimming.
    #[error("Symbol is empty")]
    Empty,

    /// The symbol contains a character that cannot appear in a ticker.
    #[error("Invalid character {ch:?} in symbol {symbol:?}")]
    InvalidCharacter {
        /// The offending symbol.
        symbol: String,
        /// The first rejected character.
        ch: char,
    },
}
