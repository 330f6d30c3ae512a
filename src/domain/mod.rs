//! Domain types and determinism layer for the lot ladder engine.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Symbol
//! - Tax lots, quotes, candles and option positions
//! - Recommendation view models with camelCase JSON serialization
//! - Stable lot ordering for deterministic processing

pub mod candle;
pub mod decimal;
pub mod option;
pub mod ordering;
pub mod primitives;
pub mod quote;
pub mod recommendation;
pub mod tax_lot;

pub use candle::Candle;
pub use decimal::Decimal;
pub use option::{OptionPosition, OptionSymbol, OptionSymbolError, OptionsSummary, PutCall};
pub use ordering::{sort_lots_by_cost_desc, LotOrderingKey};
pub use primitives::{Symbol, SymbolParseError, TimeMs};
pub use quote::Quote;
pub use recommendation::{
    BuyRecommendation, BuySequenceOrder, PercentBuyRecommendation, SellRecommendation, SellStrategy,
};
pub use tax_lot::{LotSlice, TaxLot, TaxLotError};
