//! In-memory [`RemoteSource`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use quotesync_types::{FetchWindow, Symbol};

use crate::parse::clean_cell;
use crate::{Probe, RawRow, RemoteSource, SourceError};

/// A scripted remote source that records every call.
///
/// Range fetches return the configured rows whose date cell falls inside the
/// window; rows with an unparsable date cell are always returned so malformed
/// input can be exercised.
#[derive(Debug, Default)]
pub struct MockSource {
    profiles: Mutex<HashMap<String, String>>,
    rows: Mutex<HashMap<String, Vec<RawRow>>>,
    windows: Mutex<Vec<(Symbol, FetchWindow)>>,
    probes: AtomicUsize,
    fail_probes: AtomicBool,
    fail_fetches: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockSource {
    /// Creates a source that knows no symbols.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile so probes for `symbol` succeed.
    #[must_use]
    pub fn with_profile(self, symbol: &str, about: &str) -> Self {
        self.set_profile(symbol, about);
        self
    }

    /// Registers a profile on a shared source.
    pub fn set_profile(&self, symbol: &str, about: &str) {
        lock(&self.profiles).insert(symbol.to_lowercase(), about.to_string());
    }

    /// Sets the rows served for `symbol`.
    #[must_use]
    pub fn with_rows(self, symbol: &str, rows: Vec<RawRow>) -> Self {
        self.set_rows(symbol, rows);
        self
    }

    /// Replaces the rows served for `symbol`.
    pub fn set_rows(&self, symbol: &str, rows: Vec<RawRow>) {
        lock(&self.rows).insert(symbol.to_lowercase(), rows);
    }

    /// Makes every probe fail with a transport error.
    pub fn fail_probes(&self, fail: bool) {
        self.fail_probes.store(fail, Ordering::SeqCst);
    }

    /// Makes every range fetch fail with a transport error.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of probes issued.
    #[must_use]
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Returns the number of range fetches issued.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        lock(&self.windows).len()
    }

    /// Returns every requested window in call order.
    #[must_use]
    pub fn windows(&self) -> Vec<(Symbol, FetchWindow)> {
        lock(&self.windows).clone()
    }
}

#[async_trait]
impl RemoteSource for MockSource {
    async fn validate_symbol(&self, symbol: &Symbol) -> Result<Probe, SourceError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.fail_probes.load(Ordering::SeqCst) {
            return Err(SourceError::ServerError { status: 503 });
        }

        Ok(lock(&self.profiles)
            .get(symbol.as_str())
            .map_or(Probe::NotFound, |about| Probe::Found {
                about: about.clone(),
            }))
    }

    async fn fetch_range(
        &self,
        symbol: &Symbol,
        window: FetchWindow,
    ) -> Result<Vec<RawRow>, SourceError> {
        lock(&self.windows).push((symbol.clone(), window));
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(SourceError::Timeout(1));
        }

        let rows = lock(&self.rows)
            .get(symbol.as_str())
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row.first()
                            .and_then(|cell| {
                                NaiveDate::parse_from_str(&clean_cell(cell), "%Y-%m-%d").ok()
                            })
                            .is_none_or(|date| (window.start()..=window.end()).contains(&date))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}
