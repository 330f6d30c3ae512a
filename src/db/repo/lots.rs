//! Tax lot operations for the repository.

use crate::domain::{Decimal, Symbol, TaxLot, TaxLotError, TimeMs};
use sqlx::Row;

use super::{decode_decimal, RepoError, Repository};

/// Persisted lot fields. The current price is not stored; it is joined in
/// from the latest quote when the lot is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLot {
    pub open_date: TimeMs,
    pub quantity: Decimal,
    pub cost_per_share: Decimal,
    pub split_multiple: Decimal,
}

impl StoredLot {
    pub fn into_tax_lot(self, price: Decimal) -> Result<TaxLot, TaxLotError> {
        TaxLot::new(
            self.open_date,
            self.quantity,
            price,
            self.cost_per_share,
            self.split_multiple,
        )
    }
}

impl From<&TaxLot> for StoredLot {
    fn from(lot: &TaxLot) -> Self {
        StoredLot {
            open_date: lot.open_date(),
            quantity: lot.quantity(),
            cost_per_share: lot.cost_per_share(),
            split_multiple: lot.split_multiple(),
        }
    }
}

impl Repository {
    /// Replace every lot of `symbol` in one transaction.
    ///
    /// Lots are recomputed wholesale from transaction history, so there is no
    /// per-lot update. Input order is preserved on read.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn replace_tax_lots(&self, symbol: &Symbol, lots: &[StoredLot]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tax_lots WHERE symbol = ?")
            .bind(symbol.as_str())
            .execute(&mut *tx)
            .await?;

        for (seq, lot) in lots.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO tax_lots (symbol, seq, open_date_ms, quantity, cost_per_share, split_multiple)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(symbol.as_str())
            .bind(seq as i64)
            .bind(lot.open_date.as_ms())
            .bind(lot.quantity.to_canonical_string())
            .bind(lot.cost_per_share.to_canonical_string())
            .bind(lot.split_multiple.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(lots.len())
    }

    /// Lots for `symbol` in insertion order.
    ///
    /// # Errors
    /// Returns an error if the query fails or any stored decimal is corrupt.
    pub async fn query_tax_lots(&self, symbol: &Symbol) -> Result<Vec<StoredLot>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT open_date_ms, quantity, cost_per_share, split_multiple
            FROM tax_lots
            WHERE symbol = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(symbol.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let column = |name: &'static str| {
                    let raw: String = row.get(name);
                    decode_decimal("tax_lots", name, symbol.as_str(), &raw)
                };
                Ok(StoredLot {
                    open_date: TimeMs::new(row.get("open_date_ms")),
                    quantity: column("quantity")?,
                    cost_per_share: column("cost_per_share")?,
                    split_multiple: column("split_multiple")?,
                })
            })
            .collect()
    }
}
