//! Remote source interface and HTTP fetching for quotesync.
//!
//! This crate provides everything between the synchronizer and the network:
//!
//! - [`RemoteSource`] - The capability the core consumes: symbol probes and range fetches
//! - [`parse::parse_rows`] - Shape filtering and numeric coercion of raw text rows
//! - [`HttpClient`] - HTTP client with request timeouts and retries
//! - [`YahooSource`] - A [`RemoteSource`] backed by the Yahoo Finance chart endpoint
//! - [`url`] - Endpoint URL construction

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quotesync/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
#[cfg(any(test, feature = "test-util"))]
mod mock;
pub mod parse;
mod source;
pub mod url;
mod yahoo;

pub use client::{ClientConfig, HttpClient, SourceError};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockSource;
pub use parse::{ParseError, parse_row, parse_rows};
pub use source::{Probe, RawRow, RemoteSource};
pub use yahoo::{YahooConfig, YahooSource};
