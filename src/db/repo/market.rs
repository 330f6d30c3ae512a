//! Quote and candle operations for the repository.

use crate::domain::{Candle, Quote, Symbol, TimeMs};
use sqlx::Row;

use super::{decode_decimal, RepoError, Repository};

impl Repository {
    /// Store the latest quote for its symbol, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_quote(&self, quote: &Quote) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO quotes (symbol, last_price, extended_last_price, regular_market_last_price, updated_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(symbol) DO UPDATE SET
                last_price = excluded.last_price,
                extended_last_price = excluded.extended_last_price,
                regular_market_last_price = excluded.regular_market_last_price,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(quote.symbol.as_str())
        .bind(quote.last_price.map(|d| d.to_canonical_string()))
        .bind(quote.extended_last_price.map(|d| d.to_canonical_string()))
        .bind(quote.regular_market_last_price.map(|d| d.to_canonical_string()))
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Latest stored quote for `symbol`.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored price is corrupt.
    pub async fn get_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, RepoError> {
        let row = sqlx::query(
            r#"
            SELECT symbol, last_price, extended_last_price, regular_market_last_price
            FROM quotes
            WHERE symbol = ?
            "#,
        )
        .bind(symbol.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored_symbol: String = row.get("symbol");
        let price = |column: &'static str| {
            row.get::<Option<String>, _>(column)
                .map(|raw| decode_decimal("quotes", column, &stored_symbol, &raw))
                .transpose()
        };
        Ok(Some(Quote {
            last_price: price("last_price")?,
            extended_last_price: price("extended_last_price")?,
            regular_market_last_price: price("regular_market_last_price")?,
            symbol: Symbol::new(stored_symbol.clone()),
        }))
    }

    /// Insert or overwrite daily candles for `symbol`.
    ///
    /// Returns the number of candles written.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn upsert_candles(&self, symbol: &Symbol, candles: &[Candle]) -> Result<usize, sqlx::Error> {
        if candles.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for candle in candles {
            sqlx::query(
                r#"
                INSERT INTO candles (symbol, time_ms, open, high, low, close)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(symbol, time_ms) DO UPDATE SET
                    open = excluded.open,
                    high = excluded.high,
                    low = excluded.low,
                    close = excluded.close
                "#,
            )
            .bind(symbol.as_str())
            .bind(candle.time.as_ms())
            .bind(candle.open.to_canonical_string())
            .bind(candle.high.to_canonical_string())
            .bind(candle.low.to_canonical_string())
            .bind(candle.close.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(candles.len())
    }

    /// Candles for `symbol`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or any stored price is corrupt.
    pub async fn query_candles(&self, symbol: &Symbol) -> Result<Vec<Candle>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT time_ms, open, high, low, close
            FROM candles
            WHERE symbol = ?
            ORDER BY time_ms ASC
            "#,
        )
        .bind(symbol.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let column = |name: &'static str| {
                    let raw: String = row.get(name);
                    decode_decimal("candles", name, symbol.as_str(), &raw)
                };
                Ok(Candle {
                    time: TimeMs::new(row.get("time_ms")),
                    open: column("open")?,
                    high: column("high")?,
                    low: column("low")?,
                    close: column("close")?,
                })
            })
            .collect()
    }
}
