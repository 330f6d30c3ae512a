//! Average True Range with Wilder smoothing, expressed as a percent of the
//! last close.

use crate::domain::{Candle, Decimal};

pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Wilder-smoothed ATR over `candles` (oldest first).
///
/// Seeded with the simple mean of the first `period` true ranges, then
/// `atr = (prev × (n − 1) + tr) / n`. `None` when fewer than `period`
/// candles are available or `period` is zero.
pub fn average_true_range(candles: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let n = Decimal::from(i64::try_from(period).ok()?);

    let true_ranges: Vec<Decimal> = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let prev_close = i.checked_sub(1).map(|p| candles[p].close);
            candle.true_range(prev_close)
        })
        .collect();

    let seed: Decimal = true_ranges[..period].iter().copied().sum();
    let mut atr = seed.checked_div(n)?;

    for tr in &true_ranges[period..] {
        atr = (atr * (n - Decimal::ONE) + *tr).checked_div(n)?;
    }

    Some(atr)
}

/// ATR as a percent of the most recent close.
pub fn atr_percent(candles: &[Candle], period: usize) -> Option<Decimal> {
    let atr = average_true_range(candles, period)?;
    let last_close = candles.last()?.close;
    atr.checked_div(last_close)
        .map(|ratio| ratio * Decimal::HUNDRED)
}
