//! Per-symbol mutual exclusion.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use quotesync_types::Symbol;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Mutex<HashMap<Symbol, Arc<AsyncMutex<()>>>>;

/// Hands out one async lock per symbol.
///
/// Holding the guard for a symbol excludes every other holder of the same
/// symbol. Different symbols never wait on each other. An entry is removed
/// when its last holder releases it with nobody waiting, so the table only
/// holds symbols currently in use.
#[derive(Debug, Default)]
pub struct SymbolLocks {
    table: Arc<LockTable>,
}

/// Exclusive access to one symbol, released on drop.
#[derive(Debug)]
pub struct SymbolGuard {
    symbol: Symbol,
    guard: Option<OwnedMutexGuard<()>>,
    table: Arc<LockTable>,
}

impl SymbolLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `symbol`.
    pub async fn acquire(&self, symbol: &Symbol) -> SymbolGuard {
        let lock = Arc::clone(self.table.lock().entry(symbol.clone()).or_default());
        SymbolGuard {
            symbol: symbol.clone(),
            guard: Some(lock.lock_owned().await),
            table: Arc::clone(&self.table),
        }
    }

    /// Returns the number of symbols currently held or waited on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Returns true if no symbol is held or waited on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }
}

impl Drop for SymbolGuard {
    fn drop(&mut self) {
        let mut table = self.table.lock();
        if let Some(guard) = self.guard.take() {
            // Table entry plus this guard: no waiter has cloned the lock.
            let idle = Arc::strong_count(OwnedMutexGuard::mutex(&guard)) == 2;
            drop(guard);
            if idle {
                table.remove(&self.symbol);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_same_symbol_is_exclusive() {
        let locks = SymbolLocks::new();
        let guard = locks.acquire(&sym("aapl")).await;

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(&sym("AAPL"))).await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(&sym("aapl"))).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_different_symbols_do_not_contend() {
        let locks = SymbolLocks::new();
        let _aapl = locks.acquire(&sym("aapl")).await;

        let msft =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(&sym("msft"))).await;
        assert!(msft.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_removed() {
        let locks = SymbolLocks::new();
        let aapl = locks.acquire(&sym("aapl")).await;
        let msft = locks.acquire(&sym("msft")).await;
        assert_eq!(locks.len(), 2);

        drop(aapl);
        assert_eq!(locks.len(), 1);

        drop(msft);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_survives_while_waiter_queued() {
        let locks = Arc::new(SymbolLocks::new());
        let first = locks.acquire(&sym("aapl")).await;

        let waiter = tokio::spawn({
            let locks = Arc::clone(&locks);
            async move {
                let _guard = locks.acquire(&sym("aapl")).await;
            }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
