pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use datasource::{DataSource, DataSourceError, MockDataSource, SqliteDataSource};
pub use db::{init_db, Repository};
pub use domain::{
    BuyRecommendation, BuySequenceOrder, Decimal, OptionsSummary, PercentBuyRecommendation, Quote,
    SellRecommendation, SellStrategy, Symbol, TaxLot, TimeMs,
};
pub use error::AppError;
pub use orchestration::{RecommendationService, RecommendationSet, SnapshotCache};
