//! Repository layer for the lot store.
//!
//! Methods are organized across submodules by collaborator:
//! - `lots.rs` - reconstructed tax lots per symbol
//! - `market.rs` - quotes and daily candles
//! - `options.rs` - option positions keyed by OCC symbol
//!
//! Decimals are stored as canonical strings so values round-trip exactly.
//! A stored value that no longer parses fails the whole read with
//! [`RepoError::CorruptValue`]; rows are never skipped.
//!
//! The recommendation service only reads. Rows are written by the process
//! that syncs the brokerage account, using the writer methods here:
//! - lots are replaced wholesale per symbol ([`Repository::replace_tax_lots`]);
//!   `seq` preserves the writer's order and `split_multiple` defaults to 1
//! - the quote is one row per symbol, upserted ([`Repository::upsert_quote`])
//! - candles are keyed by `(symbol, time_ms)` and upserted
//! - option positions are keyed by OCC symbol and upserted; the writer
//!   deletes a row itself once the contract closes
//!
//! A writer that bypasses these methods must store decimals in the form
//! `Decimal::to_canonical_string` produces.

mod lots;
mod market;
mod options;

pub use lots::StoredLot;

use crate::domain::Decimal;
use sqlx::sqlite::SqlitePool;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Error type for repository reads.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("corrupt {table}.{column} for {key}: {value:?}")]
    CorruptValue {
        table: &'static str,
        column: &'static str,
        key: String,
        value: String,
    },
}

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Decode a stored decimal column.
fn decode_decimal(
    table: &'static str,
    column: &'static str,
    key: &str,
    raw: &str,
) -> Result<Decimal, RepoError> {
    Decimal::from_str(raw).map_err(|e| {
        warn!(table, column, key, value = %raw, error = %e, "corrupt stored decimal");
        RepoError::CorruptValue {
            table,
            column,
            key: key.to_string(),
            value: raw.to_string(),
        }
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Repository;
    use crate::db::init_db;
    use tempfile::TempDir;

    /// Fresh repository in a temp dir; keep the `TempDir` alive for the test.
    pub async fn temp_repo() -> (TempDir, Repository) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (temp_dir, Repository::new(pool))
    }
}
