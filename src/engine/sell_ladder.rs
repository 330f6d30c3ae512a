//! Incremental "sell more as price rises" ladder.
//!
//! Lots are consumed most expensive first so every rung realizes the worst
//! basis before touching the best.

use crate::domain::{sort_lots_by_cost_desc, Decimal, SellRecommendation, SellStrategy, TaxLot};
use crate::engine::aggregator::running_totals;

/// 1.035: minimum 3.5% cushion above break-even before a rung is offered.
const EXIT_BASE: Decimal = Decimal::scaled(1035, 3);
/// 1.015
const TARGET_OVER_EXIT: Decimal = Decimal::scaled(1015, 3);

/// One recommendation per profitable cost-descending prefix of `lots`.
///
/// The result is ascending by share count. Prefixes whose exit price is
/// above `current_price` are skipped but still accumulated into the next
/// prefix.
pub fn sell_ladder(lots: &[TaxLot], current_price: Decimal, atr_percent: Decimal) -> Vec<SellRecommendation> {
    let sorted = sort_lots_by_cost_desc(lots);
    let mut ladder = Vec::new();

    for total in running_totals(&sorted) {
        let Some(blended) = total.blended_cost().filter(Decimal::is_positive) else {
            continue;
        };

        let exit = blended * (EXIT_BASE + atr_percent.pct());
        if current_price < exit {
            continue;
        }

        let target = exit * TARGET_OVER_EXIT;
        let entry = (current_price + target) / Decimal::from(2i64);
        let Some(trailing_stop) = (entry - target)
            .checked_div(entry)
            .map(|ratio| ratio * Decimal::HUNDRED)
        else {
            continue;
        };
        let Some(gain) = (target - blended).checked_div(blended) else {
            continue;
        };

        let description = format!(
            "Sell {:.0} shares TS={:.1}, Entry Ask < {:.2}, Cancel Ask < {:.2}",
            total.shares, trailing_stop, entry, exit
        );

        ladder.push(SellRecommendation {
            strategy: SellStrategy::Ladder,
            shares_to_sell: total.shares,
            rolling_gain_loss: total.realized_gain,
            break_even: blended,
            gain_percent: gain,
            trailing_stop_percent: trailing_stop,
            entry_price: entry,
            target_price: target,
            exit_price: exit,
            description,
            open_date: total.last_open_date.to_date_string(),
        });
    }

    tracing::debug!(rungs = ladder.len(), lots = lots.len(), "sell ladder computed");
    ladder
}
