//! The synchronization engine.

use std::fmt;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use quotesync_fetch::RemoteSource;
use quotesync_store::{Lookup, StorageLayout, SymbolRegistry, TimeSeriesStore};
use quotesync_types::{Series, Symbol};
use tracing::{debug, info};

use crate::{Clock, Result, SymbolLocks, SyncError, SyncState, SystemClock};

/// Configuration for [`SyncEngine`].
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Maximum number of symbols synchronized at once.
    pub parallelism: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// What a successful sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No series was stored; the full history was downloaded.
    Downloaded {
        /// Number of bars stored.
        bars: usize,
    },
    /// New bars were merged into the stored series.
    Updated {
        /// Number of dates added.
        added: usize,
    },
    /// The stored series needed no new bars.
    UpToDate,
}

/// Result of a successful sync.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// The normalized symbol.
    pub symbol: Symbol,
    /// What the sync did.
    pub outcome: SyncOutcome,
    /// The complete stored series after the sync.
    pub series: Series,
    /// States visited, in order.
    pub states: Vec<SyncState>,
}

/// Records the states one sync passes through.
struct Transitions<'a> {
    symbol: &'a Symbol,
    visited: Vec<SyncState>,
}

impl<'a> Transitions<'a> {
    fn new(symbol: &'a Symbol) -> Self {
        Self {
            symbol,
            visited: vec![SyncState::Unvalidated],
        }
    }

    fn current(&self) -> SyncState {
        self.visited
            .last()
            .copied()
            .unwrap_or(SyncState::Unvalidated)
    }

    fn advance(&mut self, next: SyncState) {
        let from = self.current();
        debug_assert!(from.can_advance_to(next), "illegal transition {from} -> {next}");
        debug!(symbol = %self.symbol, %from, to = %next, "sync state");
        self.visited.push(next);
    }
}

/// Keeps symbols' stored series current with a remote source.
///
/// Each [`sync`](Self::sync) call runs a fresh state machine: the symbol is
/// validated against the registry, then either fully downloaded or updated
/// with the bars since its last stored date. Calls for the same symbol are
/// serialized, within the process by [`SymbolLocks`] and across processes by
/// the store's advisory lock. Calls for different symbols run independently.
pub struct SyncEngine {
    source: Arc<dyn RemoteSource>,
    registry: SymbolRegistry,
    store: TimeSeriesStore,
    locks: SymbolLocks,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Opens the stores in `layout` and creates an engine over `source`.
    ///
    /// The engine uses the system clock and default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol registry cannot be loaded or created.
    pub async fn open(layout: StorageLayout, source: Arc<dyn RemoteSource>) -> Result<Self> {
        let registry = SymbolRegistry::open(&layout).await?;
        Ok(Self {
            source,
            registry,
            store: TimeSeriesStore::new(layout),
            locks: SymbolLocks::new(),
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        })
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the symbol registry.
    #[must_use]
    pub const fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// Returns the series store.
    #[must_use]
    pub const fn store(&self) -> &TimeSeriesStore {
        &self.store
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Brings the stored series for `symbol` up to date.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSymbol`] for a malformed identifier,
    /// [`SyncError::UnknownSymbol`] if the source does not recognize it, and
    /// [`SyncError::Store`] for transport, parse or persistence failures.
    /// The stored series is never left partially written.
    pub async fn sync(&self, symbol: &str) -> Result<SyncReport> {
        let symbol = Symbol::new(symbol)?;
        let _guard = self.locks.acquire(&symbol).await;
        let mut transitions = Transitions::new(&symbol);
        let source = self.source.as_ref();

        transitions.advance(SyncState::Validating);
        if !self.registry.validate(&symbol, source).await? {
            transitions.advance(SyncState::Rejected);
            return Err(SyncError::UnknownSymbol(symbol.clone()));
        }

        let _file_lock = self.store.lock(&symbol).await?;
        let today = self.clock.today();
        let (outcome, series) = match self.store.load(&symbol).await? {
            Lookup::NotFound => {
                transitions.advance(SyncState::ValidatedNoData);
                transitions.advance(SyncState::Downloading);
                let series = self.store.full_download(&symbol, source, today).await?;
                (SyncOutcome::Downloaded { bars: series.len() }, series)
            }
            Lookup::Found(existing) => {
                transitions.advance(SyncState::Updating);
                let before = existing.len();
                let series = self
                    .store
                    .incremental_update(&symbol, existing, source, today)
                    .await?;
                let outcome = match series.len() - before {
                    0 => SyncOutcome::UpToDate,
                    added => SyncOutcome::Updated { added },
                };
                (outcome, series)
            }
        };

        transitions.advance(SyncState::Synced);
        info!(%symbol, ?outcome, last = ?series.last_date(), "synced");

        let states = transitions.visited;
        Ok(SyncReport {
            symbol,
            outcome,
            series,
            states,
        })
    }

    /// Synchronizes many symbols, running up to `parallelism` at once.
    ///
    /// Results are yielded in input order, each paired with the identifier
    /// as given.
    pub fn sync_stream<'a, I>(
        &'a self,
        symbols: I,
    ) -> impl Stream<Item = (String, Result<SyncReport>)> + 'a
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        stream::iter(symbols)
            .map(move |symbol| async move {
                let result = self.sync(&symbol).await;
                (symbol, result)
            })
            .buffered(self.config.parallelism.max(1))
    }

    /// Synchronizes many symbols and collects the results in input order.
    pub async fn sync_many<I>(&self, symbols: I) -> Vec<(String, Result<SyncReport>)>
    where
        I: IntoIterator<Item = String>,
    {
        self.sync_stream(symbols).collect().await
    }
}
