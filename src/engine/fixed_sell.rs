//! Single-result sell strategies.
//!
//! "Top 100" and "Minimum Break-Even" stand alone. The ATR-stop sells ("Min
//! ATR" and "1% TS") and "Max Shares" are offered next to them: Min ATR once
//! the position is comfortably in profit, the other two only alongside a
//! Minimum Break-Even sell.

use crate::domain::{
    sort_lots_by_cost_desc, Decimal, SellRecommendation, SellStrategy, Symbol, TaxLot,
};
use crate::engine::aggregator::{position_totals, take_shares, total};
use crate::engine::single_buy::TARGET_GAIN_PER_ATR;
use tracing::debug;

const TOP_100_SHARES: Decimal = Decimal::scaled(100, 0);
/// 1.5 × 0.25, in percent.
const TOP_100_STOP: Decimal = Decimal::scaled(375, 3);
const TOP_100_TARGET_OVER_COST: Decimal = Decimal::scaled(10325, 4);
const TOP_100_EXIT_UNDER_TARGET: Decimal = Decimal::scaled(991, 3);

/// Minimum gain over break-even, in percent.
const MIN_GAIN_PERCENT: Decimal = Decimal::ONE;
/// 1 + MIN_GAIN_PERCENT / 100
const MIN_GAIN_FACTOR: Decimal = Decimal::scaled(101, 2);

/// ATR-stop sells must clear break-even by 5% at their target.
const ATR_SELL_GAIN_FACTOR: Decimal = Decimal::scaled(105, 2);
const MIN_ATR_PROFIT_FLOOR: Decimal = Decimal::scaled(6, 0);
const MIN_ATR_PROFIT_PER_ATR: Decimal = Decimal::scaled(35, 1);
const ONE_PERCENT: Decimal = Decimal::ONE;

const MAX_SHARES_STOP_OVER_COST: Decimal = Decimal::scaled(101, 2);
const MAX_SHARES_MIN_STOP: Decimal = Decimal::scaled(5, 1);
const MAX_SHARES_EXIT_UNDER_TARGET: Decimal = Decimal::scaled(95, 2);

/// Sell exactly 100 shares, consuming `lots` in the order given.
///
/// `None` when fewer than 100 shares are held or the slice costs nothing.
pub fn top_100(symbol: &Symbol, lots: &[TaxLot]) -> Option<SellRecommendation> {
    let slices = take_shares(lots, TOP_100_SHARES)?;
    let consumed = total(&slices)?;
    let blended = consumed.blended_cost().filter(Decimal::is_positive)?;

    let target = blended * TOP_100_TARGET_OVER_COST;
    let entry = target * (Decimal::ONE + TOP_100_STOP.pct());
    let exit = target * TOP_100_EXIT_UNDER_TARGET;
    let gain_percent = target.percent_change_from(blended)?;

    Some(SellRecommendation {
        strategy: SellStrategy::Top100,
        shares_to_sell: consumed.shares,
        rolling_gain_loss: consumed.shares * (target - blended),
        break_even: blended,
        gain_percent,
        trailing_stop_percent: TOP_100_STOP,
        entry_price: entry,
        target_price: target,
        exit_price: exit,
        description: format!(
            "(Top 100) SELL -{:.0} {} Entry {:.2} Target {:.2} Exit {:.2} Cost/Share {:.2} GTC",
            consumed.shares, symbol, entry, target, exit, blended
        ),
        open_date: "Top100".to_string(),
    })
}

/// Sell the fewest shares that still clear break-even by at least 1% at a
/// target just under the current price.
///
/// Lots are walked most expensive first. Whole lots are consumed until one
/// lot can carry the blend over the threshold, and then only the fewest
/// whole shares of it are taken; when the priciest lot already clears the
/// threshold on its own, a single share is sold.
pub fn min_break_even(
    symbol: &Symbol,
    lots: &[TaxLot],
    current_price: Decimal,
    atr_percent: Decimal,
) -> Option<SellRecommendation> {
    let (held_shares, held_cost) = position_totals(lots);
    let average = held_cost.checked_div(held_shares).filter(Decimal::is_positive)?;
    let profit_percent = current_price.percent_change_from(average)?;
    if profit_percent < MIN_GAIN_PERCENT {
        debug!(%symbol, %profit_percent, "min break-even guard not met");
        return None;
    }

    let stop = atr_percent / Decimal::from(5i64);
    let step_down = Decimal::ONE - (stop * Decimal::from(2i64)).pct();
    let entry = current_price * (Decimal::ONE - stop.pct());
    let target = entry * step_down;
    let exit = target * step_down;
    if !target.is_positive() {
        return None;
    }

    let (shares, cost) = minimum_qualifying_shares(&sort_lots_by_cost_desc(lots), target, MIN_GAIN_FACTOR)?;
    let break_even = cost.checked_div(shares)?;
    let gain_percent = target.percent_change_from(break_even)?;

    Some(SellRecommendation {
        strategy: SellStrategy::MinBreakEven,
        shares_to_sell: shares,
        rolling_gain_loss: shares * target - cost,
        break_even,
        gain_percent,
        trailing_stop_percent: stop,
        entry_price: entry,
        target_price: target,
        exit_price: exit,
        description: format!(
            "(Min BE) SELL -{:.0} {} Entry {:.2} Target {:.2} Exit {:.2} Cost/Share {:.2} GTC",
            shares, symbol, entry, target, exit, break_even
        ),
        open_date: "MinBE".to_string(),
    })
}

/// Profit the whole position needs before a Min ATR sell is offered:
/// `max(6, 3.5 × min(atr, 7))`.
pub fn min_atr_required_profit(atr_percent: Decimal) -> Decimal {
    MIN_ATR_PROFIT_FLOOR.max(MIN_ATR_PROFIT_PER_ATR * atr_percent.min(TARGET_GAIN_PER_ATR))
}

/// Trailing stop of one ATR; sells the fewest shares that clear break-even by
/// 5% at the target.
pub fn min_atr(
    symbol: &Symbol,
    lots: &[TaxLot],
    current_price: Decimal,
    atr_percent: Decimal,
) -> Option<SellRecommendation> {
    let (held_shares, held_cost) = position_totals(lots);
    let average = held_cost.checked_div(held_shares).filter(Decimal::is_positive)?;
    let profit_percent = current_price.percent_change_from(average)?;
    let required = min_atr_required_profit(atr_percent);
    if profit_percent < required {
        debug!(%symbol, %profit_percent, %required, "min ATR guard not met");
        return None;
    }

    atr_stop_sell(
        AtrStopSell {
            strategy: SellStrategy::MinAtr,
            label: "Min ATR",
            tag: "MinATR",
        },
        symbol,
        lots,
        current_price,
        atr_percent,
        atr_percent,
    )
}

/// Like [`min_atr`] with the trailing stop one point wider. Only offered
/// next to a Minimum Break-Even sell.
pub fn one_percent_trailing_stop(
    symbol: &Symbol,
    lots: &[TaxLot],
    current_price: Decimal,
    atr_percent: Decimal,
) -> Option<SellRecommendation> {
    atr_stop_sell(
        AtrStopSell {
            strategy: SellStrategy::OnePercentTrailingStop,
            label: "1% TS",
            tag: "1%TS",
        },
        symbol,
        lots,
        current_price,
        atr_percent,
        atr_percent + ONE_PERCENT,
    )
}

struct AtrStopSell {
    strategy: SellStrategy,
    label: &'static str,
    tag: &'static str,
}

/// Entry one ATR under the price, target `entry / (1 + stop)`, exit two ATR
/// under the target but never below break-even.
fn atr_stop_sell(
    kind: AtrStopSell,
    symbol: &Symbol,
    lots: &[TaxLot],
    current_price: Decimal,
    atr_percent: Decimal,
    stop: Decimal,
) -> Option<SellRecommendation> {
    let entry = current_price * (Decimal::ONE - atr_percent.pct());
    let target = entry.checked_div(Decimal::ONE + stop.pct())?;
    if !target.is_positive() {
        return None;
    }

    let (shares, cost) =
        minimum_qualifying_shares(&sort_lots_by_cost_desc(lots), target, ATR_SELL_GAIN_FACTOR)?;
    let break_even = cost.checked_div(shares)?;
    if target <= break_even {
        return None;
    }
    let exit = (target * (Decimal::ONE - (atr_percent * Decimal::from(2i64)).pct())).max(break_even);
    let gain_percent = target.percent_change_from(break_even)?;

    Some(SellRecommendation {
        strategy: kind.strategy,
        shares_to_sell: shares,
        rolling_gain_loss: shares * target - cost,
        break_even,
        gain_percent,
        trailing_stop_percent: stop,
        entry_price: entry,
        target_price: target,
        exit_price: exit,
        description: format!(
            "({}) SELL -{:.0} {} Entry {:.2} Target {:.2} Exit {:.2} Cost/Share {:.2} GTC",
            kind.label, shares, symbol, entry, target, exit, break_even
        ),
        open_date: kind.tag.to_string(),
    })
}

/// Sell the whole position with the stop set 1% over its blended cost.
///
/// The target sits halfway between the stop price and break-even. `None`
/// when that stop is under half a percent from the current price.
pub fn max_shares(symbol: &Symbol, lots: &[TaxLot], current_price: Decimal) -> Option<SellRecommendation> {
    let (shares, cost) = position_totals(lots);
    if shares < Decimal::ONE {
        return None;
    }
    let break_even = cost.checked_div(shares).filter(Decimal::is_positive)?;

    let stop_price = break_even * MAX_SHARES_STOP_OVER_COST;
    let trailing_stop = -stop_price.percent_change_from(current_price)?;
    if trailing_stop < MAX_SHARES_MIN_STOP {
        debug!(%symbol, %trailing_stop, "max shares stop too tight");
        return None;
    }

    let target = (stop_price + break_even) / Decimal::from(2i64);
    let exit = target * MAX_SHARES_EXIT_UNDER_TARGET;
    let gain_percent = target.percent_change_from(break_even)?;

    Some(SellRecommendation {
        strategy: SellStrategy::MaxShares,
        shares_to_sell: shares,
        rolling_gain_loss: shares * (target - break_even),
        break_even,
        gain_percent,
        trailing_stop_percent: trailing_stop,
        entry_price: stop_price,
        target_price: target,
        exit_price: exit,
        description: format!(
            "(Max Shares) SELL -{:.0} {} Entry {:.2} Target {:.2} Exit {:.2} Cost/Share {:.2} GTC",
            shares, symbol, stop_price, target, exit, break_even
        ),
        open_date: "MaxShares".to_string(),
    })
}

/// Smallest `(shares, cost)` taken from `sorted` such that
/// `target × shares ≥ gain_factor × cost`.
fn minimum_qualifying_shares(
    sorted: &[TaxLot],
    target: Decimal,
    gain_factor: Decimal,
) -> Option<(Decimal, Decimal)> {
    let mut shares = Decimal::ZERO;
    let mut cost = Decimal::ZERO;

    for lot in sorted {
        let per_share_margin = target - gain_factor * lot.cost_per_share();
        if per_share_margin.is_positive() {
            // n × margin ≥ gain_factor × cost − target × shares
            let deficit = gain_factor * cost - target * shares;
            let needed = deficit
                .checked_div(per_share_margin)?
                .ceil()
                .max(Decimal::ONE);
            if needed <= lot.quantity() {
                return Some((shares + needed, cost + needed * lot.cost_per_share()));
            }
        }
        shares += lot.quantity();
        cost += lot.cost_basis();
        if target * shares >= gain_factor * cost {
            return Some((shares, cost));
        }
    }

    None
}
