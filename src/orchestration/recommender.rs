use super::cache::{SnapshotCache, SymbolSnapshot};
use super::guard::{InputFingerprint, SelectionGuard};
use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{
    sort_lots_by_cost_desc, BuyRecommendation, BuySequenceOrder, Decimal, PercentBuyRecommendation,
    SellRecommendation, Symbol,
};
use crate::engine::{self, Clock};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Both recommendation lists for one symbol, as handed to the presentation
/// layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub symbol: Symbol,
    pub current_price: Option<Decimal>,
    pub atr_percent: Option<Decimal>,
    pub sell_ladder: Vec<SellRecommendation>,
    pub top100: Option<SellRecommendation>,
    pub min_break_even: Option<SellRecommendation>,
    pub min_atr: Option<SellRecommendation>,
    pub one_percent_trailing_stop: Option<SellRecommendation>,
    pub max_shares: Option<SellRecommendation>,
    pub buy: Option<BuyRecommendation>,
    pub percent_buys: Vec<PercentBuyRecommendation>,
    pub buy_sequence: Vec<BuySequenceOrder>,
    pub input_fingerprint: InputFingerprint,
}

impl RecommendationSet {
    fn empty(snapshot: &SymbolSnapshot) -> Self {
        Self {
            symbol: snapshot.symbol.clone(),
            current_price: snapshot.price,
            atr_percent: snapshot.atr_percent,
            sell_ladder: Vec::new(),
            top100: None,
            min_break_even: None,
            min_atr: None,
            one_percent_trailing_stop: None,
            max_shares: None,
            buy: None,
            percent_buys: Vec::new(),
            buy_sequence: Vec::new(),
            input_fingerprint: snapshot.fingerprint.clone(),
        }
    }

    /// Run every calculator over `snapshot`.
    ///
    /// Without a price nothing is computed. Without an ATR only the Top-100
    /// sell, which does not depend on volatility, is produced.
    pub fn compute(snapshot: &SymbolSnapshot, now: NaiveDateTime) -> Self {
        let mut set = Self::empty(snapshot);
        let Some(price) = snapshot.price else {
            return set;
        };
        if snapshot.lots.is_empty() && snapshot.options.minimum_strike.is_none() {
            return set;
        }

        let symbol = &snapshot.symbol;
        let by_cost = sort_lots_by_cost_desc(&snapshot.lots);
        set.top100 = engine::top_100(symbol, &by_cost);

        let Some(atr) = snapshot.atr_percent else {
            return set;
        };

        set.sell_ladder = engine::sell_ladder(&snapshot.lots, price, atr);
        set.min_break_even = engine::min_break_even(symbol, &snapshot.lots, price, atr);
        set.min_atr = engine::min_atr(symbol, &snapshot.lots, price, atr);
        if set.min_break_even.is_some() {
            set.one_percent_trailing_stop =
                engine::one_percent_trailing_stop(symbol, &snapshot.lots, price, atr);
            set.max_shares = engine::max_shares(symbol, &snapshot.lots, price);
        }

        let (shares, cost) = engine::position_totals(&snapshot.lots);
        if let Some(average) = cost.checked_div(shares) {
            set.buy = engine::single_buy(symbol, price, average, shares, atr, now);
        }
        set.percent_buys = engine::percent_buys(symbol, &snapshot.lots, price, atr);
        set.buy_sequence = engine::buy_sequence(symbol, price, atr, &snapshot.options);

        set
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error("background computation failed: {0}")]
    TaskFailed(String),
    #[error("no symbol selected")]
    NoSelection,
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::TaskFailed(err.to_string())
    }
}

/// Orchestrates collaborators, cache and calculators.
#[derive(Clone)]
pub struct RecommendationService {
    datasource: Arc<dyn DataSource>,
    cache: Arc<SnapshotCache>,
    clock: Arc<dyn Clock>,
    guard: Arc<SelectionGuard>,
    applied: Arc<Mutex<Option<Arc<RecommendationSet>>>>,
}

impl RecommendationService {
    pub fn new(datasource: Arc<dyn DataSource>, cache: Arc<SnapshotCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            datasource,
            cache,
            clock,
            guard: Arc::new(SelectionGuard::new()),
            applied: Arc::new(Mutex::new(None)),
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Cached inputs for `symbol`, fetching them on a miss.
    ///
    /// A quote for any other symbol is refused and treated as no price.
    pub async fn snapshot(&self, symbol: &Symbol) -> Result<Arc<SymbolSnapshot>, ServiceError> {
        if let Some(hit) = self.cache.get(symbol) {
            debug!(%symbol, "snapshot cache hit");
            return Ok(hit);
        }

        let (quote, lots, atr_percent, options) = futures::try_join!(
            self.datasource.current_quote(symbol),
            self.datasource.tax_lots(symbol),
            self.datasource.atr_percent(symbol),
            self.datasource.options_summary(symbol),
        )?;

        let price = quote.as_ref().and_then(|q| q.price_for(symbol));
        if quote.is_some() && price.is_none() {
            info!(%symbol, "quote unusable for requested symbol, refusing price");
        }

        let snapshot = Arc::new(SymbolSnapshot::new(symbol.clone(), price, lots, atr_percent, options));
        debug!(%symbol, fingerprint = %snapshot.fingerprint, lots = snapshot.lots.len(), "snapshot fetched");
        self.cache.insert(snapshot.clone());
        Ok(snapshot)
    }

    /// Compute recommendations for `symbol` on the blocking pool.
    pub async fn recommendations(&self, symbol: &Symbol) -> Result<Arc<RecommendationSet>, ServiceError> {
        let snapshot = self.snapshot(symbol).await?;
        self.compute(snapshot).await
    }

    async fn compute(&self, snapshot: Arc<SymbolSnapshot>) -> Result<Arc<RecommendationSet>, ServiceError> {
        let now = self.clock.now();
        let set = tokio::task::spawn_blocking(move || RecommendationSet::compute(&snapshot, now)).await?;
        Ok(Arc::new(set))
    }

    /// Recommendations for several symbols, computed concurrently. Results
    /// keep the order of `symbols`.
    pub async fn batch(&self, symbols: &[Symbol]) -> Vec<(Symbol, Result<Arc<RecommendationSet>, ServiceError>)> {
        let results = futures::future::join_all(symbols.iter().map(|s| self.recommendations(s))).await;
        symbols.iter().cloned().zip(results).collect()
    }

    /// Ladder for `symbol` with only `selected` rungs kept and their trailing
    /// stops redistributed.
    pub async fn adjusted_buy_sequence(
        &self,
        symbol: &Symbol,
        selected: &[usize],
    ) -> Result<Vec<BuySequenceOrder>, ServiceError> {
        let set = self.recommendations(symbol).await?;
        Ok(engine::redistribute_trailing_stops(symbol, &set.buy_sequence, selected))
    }

    /// Make `symbol` the current selection.
    ///
    /// Switching symbols drops the applied result and the new symbol's cached
    /// snapshot, so the next computation starts from fresh inputs.
    pub fn select(&self, symbol: Symbol) {
        if self.guard.select(symbol.clone()) {
            info!(%symbol, "selection changed");
            self.cache.invalidate(&symbol);
            *self.applied_slot() = None;
        }
    }

    pub fn selected(&self) -> Option<Symbol> {
        self.guard.selected()
    }

    /// Drop cached inputs for `symbol`, or for every symbol when `None`.
    pub fn refresh(&self, symbol: Option<&Symbol>) -> usize {
        match symbol {
            Some(symbol) => {
                let dropped = usize::from(self.cache.invalidate(symbol));
                info!(%symbol, dropped, "cache refresh");
                dropped
            }
            None => {
                let dropped = self.cache.len();
                self.cache.clear();
                info!(dropped, "cache refresh (all)");
                dropped
            }
        }
    }

    /// Compute for the selected symbol and apply the result unless the
    /// selection or its inputs changed while computing.
    ///
    /// Returns `Ok(None)` when the result was discarded as stale.
    pub async fn compute_selected(&self) -> Result<Option<Arc<RecommendationSet>>, ServiceError> {
        let symbol = self.guard.selected().ok_or(ServiceError::NoSelection)?;
        let snapshot = self.snapshot(&symbol).await?;
        self.guard.observe(&symbol, &snapshot.fingerprint);

        let set = self.compute(snapshot).await?;
        Ok(self.apply(set.clone()).then_some(set))
    }

    /// Apply `set` as the current result if it is still current.
    pub fn apply(&self, set: Arc<RecommendationSet>) -> bool {
        if !self.guard.is_current(&set.symbol, &set.input_fingerprint) {
            debug!(symbol = %set.symbol, fingerprint = %set.input_fingerprint, "discarding stale result");
            return false;
        }
        *self.applied_slot() = Some(set);
        true
    }

    /// Last applied result for the selected symbol.
    pub fn current(&self) -> Option<Arc<RecommendationSet>> {
        self.applied_slot().clone()
    }

    fn applied_slot(&self) -> std::sync::MutexGuard<'_, Option<Arc<RecommendationSet>>> {
        self.applied.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
