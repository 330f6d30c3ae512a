//! Buy ladder anchored at the lowest written-option strike, and the
//! trailing-stop redistribution applied when only some rungs are submitted.

use crate::domain::{BuySequenceOrder, Decimal, OptionsSummary, Symbol};
use std::collections::BTreeSet;

const MAX_RUNGS: usize = 4;
/// Each rung targets 6% below the previous one.
const RUNG_STEP: Decimal = Decimal::scaled(94, 2);
const MAX_SHARES_PER_RUNG: Decimal = Decimal::scaled(5, 0);
const MAX_COST_PER_RUNG: Decimal = Decimal::scaled(1400, 0);
const WIDE_STRIKE_GAP_PERCENT: Decimal = Decimal::scaled(25, 0);
const FLAT_TRAILING_STOP: Decimal = Decimal::scaled(5, 0);

/// Trailing stop shared by every rung, from the strike's distance above
/// the current price.
pub fn ladder_trailing_stop(minimum_strike: Decimal, current_price: Decimal) -> Option<Decimal> {
    let gap = minimum_strike.percent_change_from(current_price)?;
    if gap > WIDE_STRIKE_GAP_PERCENT {
        Some(gap / Decimal::from(4i64) - Decimal::from(4i64))
    } else {
        Some(FLAT_TRAILING_STOP)
    }
}

fn describe(symbol: &Symbol, shares: u32, target: Decimal, entry: Decimal, stop: Decimal, cost: Decimal) -> String {
    format!(
        "BUY {} {} Target={:.2} Entry={:.2} TS={:.1}% Cost={:.2}",
        shares, symbol, target, entry, stop, cost
    )
}

/// Up to four rungs walking down from the minimum strike.
///
/// Empty when no option contract anchors the ladder. The walk stops at the
/// first rung whose entry is at or below `current_price`, or that cannot
/// afford a single share within the per-rung cost cap.
pub fn buy_sequence(
    symbol: &Symbol,
    current_price: Decimal,
    atr_percent: Decimal,
    options: &OptionsSummary,
) -> Vec<BuySequenceOrder> {
    let Some(anchor) = options.minimum_strike else {
        tracing::debug!(%symbol, "no option contracts, no buy sequence");
        return Vec::new();
    };
    let Some(trailing_stop) = ladder_trailing_stop(anchor, current_price) else {
        return Vec::new();
    };

    let mut orders = Vec::with_capacity(MAX_RUNGS);
    let mut target = anchor;

    for order_index in 0..MAX_RUNGS {
        let entry = target * (Decimal::ONE - atr_percent.pct());
        if entry <= current_price {
            break;
        }

        let affordable = match MAX_COST_PER_RUNG.checked_div(target) {
            Some(n) => n.floor(),
            None => break,
        };
        let shares = match MAX_SHARES_PER_RUNG.min(affordable).to_u32() {
            Some(n) if n > 0 => n,
            _ => break,
        };
        let order_cost = Decimal::from(shares) * target;

        orders.push(BuySequenceOrder {
            order_index,
            shares,
            target_price: target,
            entry_price: entry,
            trailing_stop_percent: trailing_stop,
            order_cost,
            description: describe(symbol, shares, target, entry, trailing_stop, order_cost),
        });

        target *= RUNG_STEP;
    }

    tracing::debug!(%symbol, rungs = orders.len(), %anchor, "buy sequence computed");
    orders
}

/// Keep only the `selected` rungs, moving the trailing stops of the rest onto
/// the selected rung with the lowest target.
///
/// Indices refer to positions in `ladder`; out-of-range and repeated indices
/// are ignored. An empty selection returns the ladder unchanged. The total
/// trailing stop across the ladder is preserved.
pub fn redistribute_trailing_stops(
    symbol: &Symbol,
    ladder: &[BuySequenceOrder],
    selected: &[usize],
) -> Vec<BuySequenceOrder> {
    let chosen: BTreeSet<usize> = selected.iter().copied().filter(|&i| i < ladder.len()).collect();
    if chosen.is_empty() {
        return ladder.to_vec();
    }

    let unselected_stop: Decimal = ladder
        .iter()
        .enumerate()
        .filter(|(i, _)| !chosen.contains(i))
        .map(|(_, order)| order.trailing_stop_percent)
        .sum();

    let absorber = chosen
        .iter()
        .copied()
        .min_by(|&a, &b| ladder[a].target_price.cmp(&ladder[b].target_price).then(a.cmp(&b)));

    chosen
        .iter()
        .map(|&i| {
            let order = &ladder[i];
            if Some(i) != absorber || !unselected_stop.is_positive() {
                return order.clone();
            }
            let adjusted = order.trailing_stop_percent + unselected_stop;
            BuySequenceOrder {
                trailing_stop_percent: adjusted,
                description: format!(
                    "{} (Adjusted TS includes {:.1}% from unchecked orders)",
                    describe(symbol, order.shares, order.target_price, order.entry_price, adjusted, order.order_cost),
                    unselected_stop
                ),
                ..order.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn anchored_at(strike: &str) -> OptionsSummary {
        OptionsSummary {
            minimum_strike: Some(d(strike)),
            minimum_days_to_expiration: Some(30),
            contract_count: 1,
        }
    }

    fn intc() -> Symbol {
        Symbol::new("INTC")
    }

    #[test]
    fn test_full_ladder_with_wide_strike_gap() {
        let ladder = buy_sequence(&intc(), d("20"), d("2"), &anchored_at("30"));

        assert_eq!(ladder.len(), 4);
        let targets: Vec<_> = ladder.iter().map(|o| o.target_price).collect();
        assert_eq!(targets, vec![d("30"), d("28.2"), d("26.508"), d("24.91752")]);
        assert_eq!(ladder[0].entry_price, d("29.4"));
        assert_eq!(ladder[0].shares, 5);
        assert_eq!(ladder[0].order_cost, d("150"));
        // gap 50% -> 50 / 4 - 4
        assert!(ladder.iter().all(|o| o.trailing_stop_percent == d("8.5")));
        assert_eq!(
            ladder[1].description,
            "BUY 5 INTC Target=28.20 Entry=27.64 TS=8.5% Cost=141.00"
        );
        for (i, order) in ladder.iter().enumerate() {
            assert_eq!(order.order_index, i);
        }
    }

    #[test]
    fn test_ladder_halts_when_entry_reaches_price() {
        let ladder = buy_sequence(&intc(), d("27"), d("2"), &anchored_at("30"));
        assert_eq!(ladder.len(), 2);
        assert!(ladder.iter().all(|o| o.entry_price > d("27")));
        assert!(ladder.iter().all(|o| o.trailing_stop_percent == d("5")));
    }

    #[test]
    fn test_rung_cost_capped() {
        let ladder = buy_sequence(&intc(), d("300"), d("2"), &anchored_at("400"));
        assert!(!ladder.is_empty());
        assert_eq!(ladder[0].shares, 3);
        assert_eq!(ladder[0].order_cost, d("1200"));
        assert!(ladder.iter().all(|o| o.order_cost <= d("1400")));
    }

    #[test]
    fn test_ladder_halts_when_no_share_is_affordable() {
        assert!(buy_sequence(&intc(), d("1000"), d("2"), &anchored_at("1500")).is_empty());
    }

    #[test]
    fn test_no_anchor_means_no_ladder() {
        assert!(buy_sequence(&intc(), d("20"), d("2"), &OptionsSummary::default()).is_empty());
    }

    #[test]
    fn test_zero_price_means_no_ladder() {
        assert!(buy_sequence(&intc(), Decimal::ZERO, d("2"), &anchored_at("30")).is_empty());
    }

    #[test]
    fn test_redistribution_moves_stops_to_lowest_selected_target() {
        let ladder = buy_sequence(&intc(), d("20"), d("2"), &anchored_at("30"));
        let adjusted = redistribute_trailing_stops(&intc(), &ladder, &[0, 2]);

        assert_eq!(adjusted.len(), 2);
        assert_eq!(adjusted[0].order_index, 0);
        assert_eq!(adjusted[0].trailing_stop_percent, d("8.5"));
        assert_eq!(adjusted[0].description, ladder[0].description);
        assert_eq!(adjusted[1].order_index, 2);
        assert_eq!(adjusted[1].trailing_stop_percent, d("25.5"));
        assert_eq!(
            adjusted[1].description,
            "BUY 5 INTC Target=26.51 Entry=25.98 TS=25.5% Cost=132.54 (Adjusted TS includes 17.0% from unchecked orders)"
        );
    }

    #[test]
    fn test_redistribution_conserves_stop_budget() {
        let ladder = buy_sequence(&intc(), d("20"), d("2"), &anchored_at("30"));
        let before: Decimal = ladder.iter().map(|o| o.trailing_stop_percent).sum();

        for selection in [vec![0], vec![1, 3], vec![0, 1, 2], vec![3, 3, 0]] {
            let adjusted = redistribute_trailing_stops(&intc(), &ladder, &selection);
            let after: Decimal = adjusted.iter().map(|o| o.trailing_stop_percent).sum();
            assert_eq!(before, after, "selection {selection:?}");
        }
    }

    #[test]
    fn test_redistribution_empty_selection_is_identity() {
        let ladder = buy_sequence(&intc(), d("20"), d("2"), &anchored_at("30"));
        assert_eq!(redistribute_trailing_stops(&intc(), &ladder, &[]), ladder);
        assert_eq!(redistribute_trailing_stops(&intc(), &ladder, &[9]), ladder);
    }

    #[test]
    fn test_redistribution_all_selected_is_identity() {
        let ladder = buy_sequence(&intc(), d("20"), d("2"), &anchored_at("30"));
        assert_eq!(redistribute_trailing_stops(&intc(), &ladder, &[0, 1, 2, 3]), ladder);
    }

    #[test]
    fn test_ladder_trailing_stop_policy() {
        assert_eq!(ladder_trailing_stop(d("30"), d("20")), Some(d("8.5")));
        assert_eq!(ladder_trailing_stop(d("25"), d("20")), Some(d("5")));
        assert_eq!(ladder_trailing_stop(d("30"), Decimal::ZERO), None);
    }
}
