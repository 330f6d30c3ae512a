//! Option position operations for the repository.

use crate::domain::{OptionPosition, Symbol};
use sqlx::Row;

use super::{decode_decimal, RepoError, Repository};

impl Repository {
    /// Insert or update an option position keyed by its OCC symbol.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_option_position(&self, position: &OptionPosition) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO option_positions (symbol, underlying, quantity)
            VALUES (?, ?, ?)
            ON CONFLICT(symbol) DO UPDATE SET
                underlying = excluded.underlying,
                quantity = excluded.quantity
            "#,
        )
        .bind(position.symbol.as_str())
        .bind(position.underlying.as_str())
        .bind(position.quantity.to_canonical_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Every option position written against `underlying`.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored quantity is corrupt.
    pub async fn query_option_positions(&self, underlying: &Symbol) -> Result<Vec<OptionPosition>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, underlying, quantity
            FROM option_positions
            WHERE underlying = ?
            ORDER BY symbol ASC
            "#,
        )
        .bind(underlying.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let symbol: String = row.get("symbol");
                let raw: String = row.get("quantity");
                let quantity = decode_decimal("option_positions", "quantity", &symbol, &raw)?;
                Ok(OptionPosition {
                    symbol,
                    underlying: Symbol::new(row.get::<String, _>("underlying")),
                    quantity,
                })
            })
            .collect()
    }
}
