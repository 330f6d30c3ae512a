//! Data source abstraction for the collaborators the recommendation engine
//! reads from: quotes, reconstructed tax lots, ATR and option positions.

use crate::db::RepoError;
use crate::domain::{Decimal, OptionsSummary, Quote, Symbol, TaxLot};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod sqlite;

pub use mock::MockDataSource;
pub use sqlite::SqliteDataSource;

/// Data source trait for everything one symbol's recommendations need.
///
/// Missing data is not an error: implementations return `None` or an empty
/// list and the service degrades to empty recommendations.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Latest quote for `symbol`, if any.
    ///
    /// Callers must still check the quote's own symbol before using it.
    async fn current_quote(&self, symbol: &Symbol) -> Result<Option<Quote>, DataSourceError>;

    /// Open tax lots for `symbol`, already reconstructed and split-adjusted.
    async fn tax_lots(&self, symbol: &Symbol) -> Result<Vec<TaxLot>, DataSourceError>;

    /// ATR as a percent of price.
    async fn atr_percent(&self, symbol: &Symbol) -> Result<Option<Decimal>, DataSourceError>;

    /// Summary of option contracts held on `symbol` as the underlying.
    async fn options_summary(&self, symbol: &Symbol) -> Result<OptionsSummary, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Backing store failed (e.g., SQLite I/O, pool closed)
    Storage(String),
    /// Stored data could not be turned into domain values
    ParseError(String),
    /// Source temporarily unavailable
    Unavailable(String),
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::Storage(msg) => write!(f, "Storage error: {}", msg),
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<RepoError> for DataSourceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Sqlx(e) => DataSourceError::Storage(e.to_string()),
            corrupt @ RepoError::CorruptValue { .. } => DataSourceError::ParseError(corrupt.to_string()),
        }
    }
}
