//! Recommendation view models handed to the presentation layer.
//!
//! All of these are created fresh on every recompute and never mutated
//! afterwards, except for buy-sequence rungs passing through trailing-stop
//! redistribution, which produces new values.

use super::Decimal;
use serde::Serialize;

/// Which calculator produced a [`SellRecommendation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SellStrategy {
    Ladder,
    Top100,
    MinBreakEven,
    MinAtr,
    OnePercentTrailingStop,
    MaxShares,
}

impl SellStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellStrategy::Ladder => "ladder",
            SellStrategy::Top100 => "top100",
            SellStrategy::MinBreakEven => "minBreakEven",
            SellStrategy::MinAtr => "minAtr",
            SellStrategy::OnePercentTrailingStop => "onePercentTrailingStop",
            SellStrategy::MaxShares => "maxShares",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRecommendation {
    pub strategy: SellStrategy,
    pub shares_to_sell: Decimal,
    /// Dollar gain realized if the consumed lots were sold.
    pub rolling_gain_loss: Decimal,
    /// Blended cost per share of the consumed lots.
    pub break_even: Decimal,
    pub gain_percent: Decimal,
    pub trailing_stop_percent: Decimal,
    pub entry_price: Decimal,
    pub target_price: Decimal,
    /// Price below which the order should be cancelled.
    pub exit_price: Decimal,
    pub description: String,
    /// Identifies the lot (ladder) or strategy that produced this entry.
    pub open_date: String,
}

/// The single buy order suggested to pull the average cost down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyRecommendation {
    pub shares: u32,
    pub target_buy_price: Decimal,
    pub entry_price: Decimal,
    pub trailing_stop_percent: Decimal,
    pub target_gain_percent: Decimal,
    pub current_gain_percent: Decimal,
    pub order_cost: Decimal,
    pub submit_date: String,
    pub description: String,
}

/// A buy sized as a fixed percent of the shares already held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentBuyRecommendation {
    pub holding_percent: Decimal,
    pub shares: u32,
    pub target_buy_price: Decimal,
    pub entry_price: Decimal,
    pub trailing_stop_percent: Decimal,
    pub target_gain_percent: Decimal,
    pub current_gain_percent: Decimal,
    pub order_cost: Decimal,
    pub description: String,
}

/// One rung of the buy ladder. Index 0 is anchored at the minimum strike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuySequenceOrder {
    pub order_index: usize,
    pub shares: u32,
    pub target_price: Decimal,
    pub entry_price: Decimal,
    pub trailing_stop_percent: Decimal,
    pub order_cost: Decimal,
    pub description: String,
}
