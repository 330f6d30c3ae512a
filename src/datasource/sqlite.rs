//! Data source backed by the SQLite lot store.

use super::{DataSource, DataSourceError};
use crate::db::Repository;
use crate::domain::{Decimal, OptionsSummary, Quote, Symbol, TaxLot};
use crate::engine::{atr_percent, Clock, SystemClock};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Reads every collaborator from the [`Repository`].
///
/// ATR is computed from stored daily candles with the configured period.
/// Lot prices are taken from the stored quote; a symbol without a quote gets
/// lots priced at zero, which the service never uses since it refuses to
/// compute without a price.
#[derive(Clone)]
pub struct SqliteDataSource {
    repo: Arc<Repository>,
    atr_period: usize,
    clock: Arc<dyn Clock>,
}

impl SqliteDataSource {
    pub fn new(repo: Arc<Repository>, atr_period: usize) -> Self {
        Self {
            repo,
            atr_period,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for days-to-expiration.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl fmt::Debug for SqliteDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDataSource")
            .field("atr_period", &self.atr_period)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DataSource for SqliteDataSource {
    async fn current_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, DataSourceError> {
        Ok(self.repo.get_quote(symbol).await?)
    }

    async fn tax_lots(&self, symbol: &Symbol) -> Result<Vec<TaxLot>, DataSourceError> {
        let price = self
            .repo
            .get_quote(symbol)
            .await?
            .and_then(|quote| quote.price_for(symbol))
            .unwrap_or(Decimal::ZERO);

        self.repo
            .query_tax_lots(symbol)
            .await?
            .into_iter()
            .map(|stored| {
                stored
                    .into_tax_lot(price)
                    .map_err(|e| DataSourceError::ParseError(format!("{symbol}: {e}")))
            })
            .collect()
    }

    async fn atr_percent(&self, symbol: &Symbol) -> Result<Option<Decimal>, DataSourceError> {
        let candles = self.repo.query_candles(symbol).await?;
        let atr = atr_percent(&candles, self.atr_period);
        debug!(%symbol, candles = candles.len(), period = self.atr_period, ?atr, "atr from candles");
        Ok(atr)
    }

    async fn options_summary(&self, symbol: &Symbol) -> Result<OptionsSummary, DataSourceError> {
        let positions = self.repo.query_option_positions(symbol).await?;
        let today = self.clock.now().date();
        Ok(OptionsSummary::from_positions(symbol, &positions, today))
    }
}
