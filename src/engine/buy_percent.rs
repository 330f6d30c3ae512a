//! Buy orders sized as fixed fractions of the current holding.

use crate::domain::{Decimal, PercentBuyRecommendation, Symbol, TaxLot};
use crate::engine::aggregator::position_totals;
use crate::engine::single_buy::TARGET_GAIN_PER_ATR;
use tracing::debug;

const HOLDING_PERCENTS: [i64; 6] = [1, 5, 10, 15, 25, 50];
const MIN_TARGET_GAIN_PERCENT: Decimal = Decimal::scaled(5, 0);
const MAX_TARGET_GAIN_PERCENT: Decimal = Decimal::scaled(35, 0);
const MIN_TARGET_OVER_PRICE: Decimal = Decimal::scaled(105, 2);
const MAX_TARGET_OVER_PRICE: Decimal = Decimal::scaled(130, 2);
/// Orders costing this much or more are dropped.
const MAX_ORDER_COST: Decimal = Decimal::scaled(2000, 0);

/// `7 × atr`, clamped to 5..=35.
pub fn percent_target_gain(atr_percent: Decimal) -> Decimal {
    (TARGET_GAIN_PER_ATR * atr_percent)
        .max(MIN_TARGET_GAIN_PERCENT)
        .min(MAX_TARGET_GAIN_PERCENT)
}

/// Price `p` at which buying `shares_to_buy` more at `p` leaves the whole
/// position `target_gain_percent` over its new cost:
/// `C × r / ((S + n) − n × r)` with `r = 1 + gain / 100`.
pub fn target_price_for_gain(
    total_shares: Decimal,
    total_cost: Decimal,
    shares_to_buy: Decimal,
    target_gain_percent: Decimal,
) -> Option<Decimal> {
    let ratio = Decimal::ONE + target_gain_percent.pct();
    let denominator = total_shares + shares_to_buy - shares_to_buy * ratio;
    if !denominator.is_positive() {
        return None;
    }
    (total_cost * ratio).checked_div(denominator)
}

/// One buy per holding percent (1% means a single share), with duplicate
/// share counts dropped and each target held within 5% to 30% over the
/// current price.
pub fn percent_buys(
    symbol: &Symbol,
    lots: &[TaxLot],
    current_price: Decimal,
    atr_percent: Decimal,
) -> Vec<PercentBuyRecommendation> {
    let (total_shares, total_cost) = position_totals(lots);
    let Some(average) = total_cost.checked_div(total_shares).filter(Decimal::is_positive) else {
        return Vec::new();
    };
    let Some(current_gain) = current_price.percent_change_from(average) else {
        return Vec::new();
    };

    let target_gain = percent_target_gain(atr_percent);
    let floor = current_price * MIN_TARGET_OVER_PRICE;
    let ceiling = current_price * MAX_TARGET_OVER_PRICE;
    let mut seen: Vec<u32> = Vec::with_capacity(HOLDING_PERCENTS.len());

    HOLDING_PERCENTS
        .iter()
        .filter_map(|&percent| {
            let holding_percent = Decimal::from(percent);
            let shares = if holding_percent == Decimal::ONE {
                Decimal::ONE
            } else {
                (total_shares * holding_percent.pct()).ceil()
            };
            let count = shares.to_u32().filter(|&n| n > 0)?;
            if seen.contains(&count) {
                return None;
            }
            seen.push(count);

            let target = target_price_for_gain(total_shares, total_cost, shares, target_gain)?
                .max(floor)
                .min(ceiling);
            if !target.is_positive() {
                return None;
            }
            let order_cost = shares * target;
            if order_cost >= MAX_ORDER_COST {
                debug!(%symbol, %holding_percent, %order_cost, "percent buy over cost cap");
                return None;
            }
            let entry = target * (Decimal::ONE - atr_percent.pct());

            Some(PercentBuyRecommendation {
                holding_percent,
                shares: count,
                target_buy_price: target,
                entry_price: entry,
                trailing_stop_percent: atr_percent,
                target_gain_percent: target_gain,
                current_gain_percent: current_gain,
                order_cost,
                description: format!(
                    "BUY {} {} ({:.0}%) Target={:.2} TS={:.1}% Gain={:.1}% Cost={:.2}",
                    count, symbol, holding_percent, target, atr_percent, target_gain, order_cost
                ),
            })
        })
        .collect()
}
