//! Per-symbol daily series persistence.

use chrono::NaiveDate;
use quotesync_fetch::{RemoteSource, parse_rows};
use quotesync_types::{Bar, FetchWindow, Series, Symbol, default_epoch_start};
use tokio::fs;
use tracing::{debug, info};

use crate::codec;
use crate::lock::FileLock;
use crate::{Result, StorageLayout, StoreError};

/// Outcome of loading a stored series.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// A non-empty series is stored for the symbol.
    Found(Series),
    /// Nothing usable is stored for the symbol.
    NotFound,
}

/// Reads, downloads and merges per-symbol series files.
///
/// Callers are expected to serialize operations on the same symbol, across
/// processes through [`lock`](Self::lock). The store itself only guarantees
/// that each file replacement is atomic.
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    layout: StorageLayout,
}

impl TimeSeriesStore {
    /// Creates a store over the given layout.
    #[must_use]
    pub const fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Returns the storage layout.
    #[must_use]
    pub const fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Takes the advisory lock on `symbol`'s series, waiting for any other
    /// process holding it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Lock`] if the lock file cannot be opened or
    /// locked.
    pub async fn lock(&self, symbol: &Symbol) -> Result<FileLock> {
        FileLock::acquire(&self.layout.series_lock_path(symbol)).await
    }

    /// Loads the stored series for `symbol`.
    ///
    /// A missing file and a file holding only the header both yield
    /// [`Lookup::NotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub async fn load(&self, symbol: &Symbol) -> Result<Lookup> {
        let path = self.layout.series_path(symbol);
        Ok(match codec::read_series(&path).await? {
            Some(series) if !series.is_empty() => Lookup::Found(series),
            _ => Lookup::NotFound,
        })
    }

    /// Downloads the entire available history for `symbol` and persists it.
    ///
    /// The window runs from 2000-01-01 to the last trading day on or before
    /// `today`. The stored file is replaced only after every row parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is empty, the fetch fails, a row is
    /// malformed, or the file cannot be written.
    pub async fn full_download(
        &self,
        symbol: &Symbol,
        source: &dyn RemoteSource,
        today: NaiveDate,
    ) -> Result<Series> {
        let window = FetchWindow::new(default_epoch_start(), today)?;
        let series = Series::from_bars(self.fetch(symbol, window, source).await?);

        self.persist(symbol, &series).await?;
        info!(%symbol, %window, bars = series.len(), "downloaded full history");
        Ok(series)
    }

    /// Fetches bars after the last stored date and merges them in.
    ///
    /// Returns `existing` untouched when it already ends on `today` or when
    /// no trading day separates its last date from `today`. Bars already
    /// stored take precedence over fetched bars for the same date.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails, a row is malformed, or the file
    /// cannot be written. The stored file is unchanged on error.
    pub async fn incremental_update(
        &self,
        symbol: &Symbol,
        existing: Series,
        source: &dyn RemoteSource,
        today: NaiveDate,
    ) -> Result<Series> {
        let Some(last_known) = existing.last_date() else {
            return self.full_download(symbol, source, today).await;
        };

        if last_known >= today {
            debug!(%symbol, %last_known, "series already current");
            return Ok(existing);
        }

        let window = match FetchWindow::new(last_known, today) {
            Ok(window) => window,
            Err(e) if e.is_empty_range() => {
                debug!(%symbol, %last_known, "no trading day since last update");
                return Ok(existing);
            }
            Err(e) => return Err(e.into()),
        };

        let incoming = self.fetch(symbol, window, source).await?;
        let merged = existing.merge(incoming);

        self.persist(symbol, &merged).await?;
        info!(
            %symbol,
            %window,
            added = merged.len() - existing.len(),
            "merged update"
        );
        Ok(merged)
    }

    /// Lists the symbols that have a series file, in sorted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the series directory cannot be read.
    pub async fn symbols(&self) -> Result<Vec<Symbol>> {
        let dir = self.layout.series_dir();
        let read_dir_err = |e| StoreError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        };

        let mut entries = fs::read_dir(dir).await.map_err(read_dir_err)?;
        let mut symbols = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv")
                && let Some(symbol) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| Symbol::new(stem).ok())
            {
                symbols.push(symbol);
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    async fn fetch(
        &self,
        symbol: &Symbol,
        window: FetchWindow,
        source: &dyn RemoteSource,
    ) -> Result<Vec<Bar>> {
        let rows = source
            .fetch_range(symbol, window)
            .await
            .map_err(|source| StoreError::Fetch {
                symbol: symbol.clone(),
                source,
            })?;
        Ok(parse_rows(&rows)?)
    }

    async fn persist(&self, symbol: &Symbol, series: &Series) -> Result<()> {
        codec::write_series(&self.layout.series_path(symbol), series).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quotesync_fetch::{MockSource, RawRow};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn row(date: &str, close: &str) -> RawRow {
        [date, close, close, close, close, close, "1,000"]
            .iter()
            .map(|cell| (*cell).to_string())
            .collect()
    }

    fn store(temp: &TempDir) -> TimeSeriesStore {
        TimeSeriesStore::new(StorageLayout::ensure(temp.path()).unwrap())
    }

    fn file_bytes(store: &TimeSeriesStore, symbol: &Symbol) -> Vec<u8> {
        std::fs::read(store.layout().series_path(symbol)).unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        assert_eq!(store(&temp).load(&sym("aapl")).await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_full_download_sorts_and_persists() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = MockSource::new().with_rows(
            "aapl",
            vec![
                row("2024-01-04", "2.0"),
                vec!["2024-01-04".into(), "0.24 Dividend".into()],
                row("2024-01-03", "1.0"),
            ],
        );

        let series = store
            .full_download(&sym("aapl"), &source, date(2024, 1, 5))
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date(2024, 1, 3)));
        assert_eq!(series.bars()[0].volume, 1000);

        let windows = source.windows();
        assert_eq!(windows[0].1.start(), date(2000, 1, 1));
        assert_eq!(windows[0].1.end(), date(2024, 1, 5));

        assert_eq!(store.load(&sym("aapl")).await.unwrap(), Lookup::Found(series));
    }

    #[tokio::test]
    async fn test_empty_download_reads_back_as_not_found() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = MockSource::new();

        let series = store
            .full_download(&sym("aapl"), &source, date(2024, 1, 5))
            .await
            .unwrap();

        assert!(series.is_empty());
        assert!(store.layout().series_path(&sym("aapl")).exists());
        assert_eq!(store.load(&sym("aapl")).await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_full_download_rejects_empty_window() {
        let temp = TempDir::new().unwrap();
        let source = MockSource::new();

        let err = store(&temp)
            .full_download(&sym("aapl"), &source, date(1999, 6, 1))
            .await
            .unwrap_err();

        assert!(err.is_empty_range());
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_incremental_same_day_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = MockSource::new().with_rows("aapl", vec![row("2024-01-03", "1.0")]);
        let existing = store
            .full_download(&sym("aapl"), &source, date(2024, 1, 3))
            .await
            .unwrap();

        let updated = store
            .incremental_update(&sym("aapl"), existing.clone(), &source, date(2024, 1, 3))
            .await
            .unwrap();

        assert_eq!(updated, existing);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_incremental_over_weekend_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = MockSource::new().with_rows("aapl", vec![row("2024-01-05", "1.0")]);
        let existing = store
            .full_download(&sym("aapl"), &source, date(2024, 1, 5))
            .await
            .unwrap();

        // 2024-01-07 is a Sunday; the last trading day is still Friday.
        let updated = store
            .incremental_update(&sym("aapl"), existing.clone(), &source, date(2024, 1, 7))
            .await
            .unwrap();

        assert_eq!(updated, existing);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_incremental_existing_wins_and_extends() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let symbol = sym("aapl");
        let source = MockSource::new().with_rows(
            "aapl",
            vec![row("2024-01-02", "1.0"), row("2024-01-03", "2.0")],
        );
        let existing = store
            .full_download(&symbol, &source, date(2024, 1, 3))
            .await
            .unwrap();

        source.set_rows(
            "aapl",
            vec![
                row("2024-01-03", "99.0"),
                row("2024-01-04", "3.0"),
                row("2024-01-05", "4.0"),
            ],
        );
        let updated = store
            .incremental_update(&symbol, existing, &source, date(2024, 1, 5))
            .await
            .unwrap();

        let dates: Vec<_> = updated.dates().collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 2),
                date(2024, 1, 3),
                date(2024, 1, 4),
                date(2024, 1, 5)
            ]
        );
        assert_relative_eq!(updated.get(date(2024, 1, 3)).unwrap().close, 2.0);

        let window = source.windows()[1].1;
        assert_eq!(window.start(), date(2024, 1, 3));
        assert_eq!(window.end(), date(2024, 1, 5));
    }

    #[tokio::test]
    async fn test_incremental_update_is_idempotent_on_disk() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let symbol = sym("aapl");
        let source = MockSource::new().with_rows("aapl", vec![row("2024-01-02", "1.0")]);
        let existing = store
            .full_download(&symbol, &source, date(2024, 1, 2))
            .await
            .unwrap();

        source.set_rows(
            "aapl",
            vec![row("2024-01-02", "1.0"), row("2024-01-03", "1.5")],
        );
        let once = store
            .incremental_update(&symbol, existing, &source, date(2024, 1, 4))
            .await
            .unwrap();
        let first = file_bytes(&store, &symbol);

        let twice = store
            .incremental_update(&symbol, once.clone(), &source, date(2024, 1, 4))
            .await
            .unwrap();

        assert_eq!(once, twice);
        assert_eq!(first, file_bytes(&store, &symbol));
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_stored_file() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let symbol = sym("aapl");
        let source = MockSource::new().with_rows("aapl", vec![row("2024-01-02", "1.0")]);
        let existing = store
            .full_download(&symbol, &source, date(2024, 1, 2))
            .await
            .unwrap();
        let before = file_bytes(&store, &symbol);

        source.fail_fetches(true);
        let err = store
            .incremental_update(&symbol, existing, &source, date(2024, 1, 4))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Fetch { .. }));
        assert_eq!(before, file_bytes(&store, &symbol));
    }

    #[tokio::test]
    async fn test_malformed_row_is_not_persisted() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let symbol = sym("aapl");
        let mut bad = row("2024-01-03", "1.0");
        bad[4] = "n/a".to_string();
        let source = MockSource::new().with_rows("aapl", vec![row("2024-01-02", "1.0"), bad]);

        let err = store
            .full_download(&symbol, &source, date(2024, 1, 3))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::MalformedRow(_)));
        assert!(!store.layout().series_path(&symbol).exists());
    }

    #[tokio::test]
    async fn test_symbols_lists_series_files() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let source = MockSource::new()
            .with_rows("msft", vec![row("2024-01-02", "1.0")])
            .with_rows("aapl", vec![row("2024-01-02", "1.0")]);

        for name in ["msft", "aapl"] {
            store
                .full_download(&sym(name), &source, date(2024, 1, 2))
                .await
                .unwrap();
        }

        let _lock = store.lock(&sym("aapl")).await.unwrap();

        assert_eq!(store.symbols().await.unwrap(), vec![sym("aapl"), sym("msft")]);
    }

    #[tokio::test]
    async fn test_lock_file_sits_beside_series() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let _lock = store.lock(&sym("aapl")).await.unwrap();

        assert!(temp.path().join("series").join(".aapl.lock").exists());
    }
}
