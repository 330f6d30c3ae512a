//! Mock data source for testing without a database.

use super::{DataSource, DataSourceError};
use crate::domain::{Decimal, OptionsSummary, Quote, Symbol, TaxLot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock data source that returns predefined test data.
///
/// Clones share the fetch counter, so a test can hand one clone to the
/// service and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    quotes: HashMap<Symbol, Quote>,
    lots: HashMap<Symbol, Vec<TaxLot>>,
    atr: HashMap<Symbol, Decimal>,
    options: HashMap<Symbol, OptionsSummary>,
    failure: Option<DataSourceError>,
    lot_fetches: Arc<AtomicUsize>,
}

impl MockDataSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quote returned for the quote's own symbol.
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol.clone(), quote);
        self
    }

    /// Return `quote` when `symbol` is requested, whatever the quote's own
    /// symbol is. Simulates a provider answering with the wrong ticker.
    pub fn with_quote_for(mut self, symbol: Symbol, quote: Quote) -> Self {
        self.quotes.insert(symbol, quote);
        self
    }

    /// Shortcut for a quote carrying only a last price.
    pub fn with_price(self, symbol: Symbol, price: Decimal) -> Self {
        self.with_quote(Quote {
            symbol,
            last_price: Some(price),
            extended_last_price: None,
            regular_market_last_price: None,
        })
    }

    /// Set the lots for a symbol.
    pub fn with_lots(mut self, symbol: Symbol, lots: Vec<TaxLot>) -> Self {
        self.lots.insert(symbol, lots);
        self
    }

    /// Set the ATR percent for a symbol.
    pub fn with_atr(mut self, symbol: Symbol, atr_percent: Decimal) -> Self {
        self.atr.insert(symbol, atr_percent);
        self
    }

    /// Set the option summary for a symbol.
    pub fn with_options(mut self, symbol: Symbol, summary: OptionsSummary) -> Self {
        self.options.insert(symbol, summary);
        self
    }

    /// Make every call fail with `error`.
    pub fn with_failure(mut self, error: DataSourceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of `tax_lots` calls served so far.
    pub fn lot_fetches(&self) -> usize {
        self.lot_fetches.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DataSourceError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn current_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, DataSourceError> {
        self.check()?;
        Ok(self.quotes.get(symbol).cloned())
    }

    async fn tax_lots(&self, symbol: &Symbol) -> Result<Vec<TaxLot>, DataSourceError> {
        self.check()?;
        self.lot_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.lots.get(symbol).cloned().unwrap_or_default())
    }

    async fn atr_percent(&self, symbol: &Symbol) -> Result<Option<Decimal>, DataSourceError> {
        self.check()?;
        Ok(self.atr.get(symbol).copied())
    }

    async fn options_summary(&self, symbol: &Symbol) -> Result<OptionsSummary, DataSourceError> {
        self.check()?;
        Ok(self.options.get(symbol).cloned().unwrap_or_default())
    }
}
