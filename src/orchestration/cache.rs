//! Bounded LRU cache of per-symbol input snapshots.

use super::guard::InputFingerprint;
use crate::domain::{Decimal, OptionsSummary, Symbol, TaxLot};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Everything fetched from collaborators for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSnapshot {
    pub symbol: Symbol,
    /// `None` when no quote for this exact symbol was available.
    pub price: Option<Decimal>,
    pub lots: Vec<TaxLot>,
    pub atr_percent: Option<Decimal>,
    pub options: OptionsSummary,
    pub fingerprint: InputFingerprint,
}

impl SymbolSnapshot {
    pub fn new(
        symbol: Symbol,
        price: Option<Decimal>,
        lots: Vec<TaxLot>,
        atr_percent: Option<Decimal>,
        options: OptionsSummary,
    ) -> Self {
        let fingerprint = InputFingerprint::compute(&symbol, price, atr_percent, &lots, &options);
        Self {
            symbol,
            price,
            lots,
            atr_percent,
            options,
            fingerprint,
        }
    }
}

/// Snapshot cache handed to the recommendation service.
///
/// Populated on fetch; entries are dropped on explicit refresh, on
/// selection change, or by least-recently-used eviction.
#[derive(Debug)]
pub struct SnapshotCache {
    entries: Mutex<LruCache<Symbol, Arc<SymbolSnapshot>>>,
}

impl SnapshotCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<Symbol, Arc<SymbolSnapshot>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up `symbol`, marking it most recently used.
    pub fn get(&self, symbol: &Symbol) -> Option<Arc<SymbolSnapshot>> {
        self.entries().get(symbol).cloned()
    }

    pub fn insert(&self, snapshot: Arc<SymbolSnapshot>) {
        let mut entries = self.entries();
        if let Some((evicted, _)) = entries.push(snapshot.symbol.clone(), snapshot) {
            if !entries.contains(&evicted) {
                tracing::debug!(symbol = %evicted, "evicted least recently used snapshot");
            }
        }
    }

    /// Drop one symbol. Returns whether it was cached.
    pub fn invalidate(&self, symbol: &Symbol) -> bool {
        self.entries().pop(symbol).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries().cap().get()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}
