//! Persistent cache of validated symbols.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quotesync_fetch::{Probe, RemoteSource};
use quotesync_types::{Symbol, SymbolRecord};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::codec;
use crate::lock::FileLock;
use crate::{Result, StorageLayout, StoreError};

/// Symbols confirmed to exist at the remote source.
///
/// Entries are only ever added, and only after a successful probe. A
/// symbol the source does not recognize is never recorded, so it will be
/// probed again on its next request.
///
/// Every insertion holds the in-memory lock and an advisory lock on
/// `.symbols.lock`, re-reads the file, merges and rewrites it. Registries
/// in other processes sharing the data directory keep each other's entries.
#[derive(Debug)]
pub struct SymbolRegistry {
    path: PathBuf,
    lock_path: PathBuf,
    known: Mutex<BTreeMap<Symbol, String>>,
}

impl SymbolRegistry {
    /// Loads the registry from the layout, creating an empty file if none
    /// exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is corrupt, or cannot
    /// be created.
    pub async fn open(layout: &StorageLayout) -> Result<Self> {
        let path = layout.registry_path();
        let lock_path = layout.registry_lock_path();

        let known = match codec::read_registry(&path).await? {
            Some(known) => known,
            None => {
                let _lock = FileLock::acquire(&lock_path).await?;
                match codec::read_registry(&path).await? {
                    Some(known) => known,
                    None => {
                        let known = BTreeMap::new();
                        codec::write_registry(&path, &known).await?;
                        known
                    }
                }
            }
        };

        debug!(path = %path.display(), symbols = known.len(), "opened symbol registry");
        Ok(Self {
            path,
            lock_path,
            known: Mutex::new(known),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the symbol has already been validated.
    pub async fn is_known(&self, symbol: &Symbol) -> bool {
        self.known.lock().await.contains_key(symbol)
    }

    /// Returns the record for a validated symbol.
    pub async fn get(&self, symbol: &Symbol) -> Option<SymbolRecord> {
        self.known
            .lock()
            .await
            .get(symbol)
            .map(|about| SymbolRecord::new(symbol.clone(), about.clone()))
    }

    /// Returns the number of validated symbols.
    pub async fn len(&self) -> usize {
        self.known.lock().await.len()
    }

    /// Returns true if no symbol has been validated.
    pub async fn is_empty(&self) -> bool {
        self.known.lock().await.is_empty()
    }

    /// Returns all records ordered by symbol.
    pub async fn records(&self) -> Vec<SymbolRecord> {
        self.known
            .lock()
            .await
            .iter()
            .map(|(symbol, about)| SymbolRecord::new(symbol.clone(), about.clone()))
            .collect()
    }

    /// Confirms that `symbol` exists, consulting `source` on a cache miss.
    ///
    /// Returns `Ok(false)` when the source positively reports the symbol as
    /// unknown. Nothing is recorded in that case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LookupFailed`] if the probe itself fails, or a
    /// write error if the new entry cannot be persisted. A failed write
    /// leaves the registry unchanged.
    pub async fn validate(&self, symbol: &Symbol, source: &dyn RemoteSource) -> Result<bool> {
        if self.is_known(symbol).await || self.reload_contains(symbol).await? {
            debug!(%symbol, "symbol already registered");
            return Ok(true);
        }

        let probe = source
            .validate_symbol(symbol)
            .await
            .map_err(|source| StoreError::LookupFailed {
                symbol: symbol.clone(),
                source,
            })?;

        let Probe::Found { about } = probe else {
            debug!(%symbol, "symbol not recognized by source");
            return Ok(false);
        };

        let mut known = self.known.lock().await;
        let _lock = FileLock::acquire(&self.lock_path).await?;
        merge_from_disk(&mut known, &self.path).await?;
        if known.contains_key(symbol) {
            return Ok(true);
        }

        known.insert(symbol.clone(), about);
        if let Err(e) = codec::write_registry(&self.path, &known).await {
            known.remove(symbol);
            return Err(e);
        }

        info!(%symbol, about = %known[symbol], "registered symbol");
        Ok(true)
    }

    /// Picks up entries written by other processes since `open`.
    async fn reload_contains(&self, symbol: &Symbol) -> Result<bool> {
        let mut known = self.known.lock().await;
        merge_from_disk(&mut known, &self.path).await?;
        Ok(known.contains_key(symbol))
    }
}

async fn merge_from_disk(known: &mut BTreeMap<Symbol, String>, path: &Path) -> Result<()> {
    if let Some(on_disk) = codec::read_registry(path).await? {
        for (symbol, about) in on_disk {
            known.entry(symbol).or_insert(about);
        }
    }
    Ok(())
}
