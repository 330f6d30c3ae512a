//! Running totals over an ordered lot sequence.
//!
//! The aggregator never sorts: callers decide the consumption order and the
//! totals follow it exactly.

use crate::domain::{Decimal, LotSlice, TaxLot, TimeMs};

/// Cumulative state after consuming one more lot (or slice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningTotal {
    pub shares: Decimal,
    pub cost: Decimal,
    /// Unrealized gain of the consumed lots, realized if they were sold.
    pub realized_gain: Decimal,
    /// Open date of the lot consumed last.
    pub last_open_date: TimeMs,
}

impl RunningTotal {
    /// Blended cost per share, `None` while no shares are held.
    pub fn blended_cost(&self) -> Option<Decimal> {
        if self.shares.is_zero() {
            return None;
        }
        self.cost.checked_div(self.shares)
    }
}

/// Running totals after each lot, in input order.
pub fn running_totals(lots: &[TaxLot]) -> Vec<RunningTotal> {
    let slices: Vec<LotSlice> = lots.iter().map(LotSlice::whole).collect();
    running_slice_totals(&slices)
}

/// Running totals after each slice, in input order.
pub fn running_slice_totals(slices: &[LotSlice]) -> Vec<RunningTotal> {
    let mut shares = Decimal::ZERO;
    let mut cost = Decimal::ZERO;
    let mut realized_gain = Decimal::ZERO;

    slices
        .iter()
        .map(|slice| {
            shares += slice.quantity;
            cost += slice.cost();
            realized_gain += slice.gain_loss_dollar;
            RunningTotal {
                shares,
                cost,
                realized_gain,
                last_open_date: slice.open_date,
            }
        })
        .collect()
}

/// Totals over every slice, `None` for an empty input.
pub fn total(slices: &[LotSlice]) -> Option<RunningTotal> {
    running_slice_totals(slices).last().copied()
}

/// Slice `lots` in the given order until exactly `shares` are taken.
///
/// The final slice may be partial. Returns `None` when `shares` is not
/// positive or the lots hold fewer than `shares` in total.
pub fn take_shares(lots: &[TaxLot], shares: Decimal) -> Option<Vec<LotSlice>> {
    if !shares.is_positive() {
        return None;
    }

    let mut remaining = shares;
    let mut slices = Vec::new();

    for lot in lots {
        if !remaining.is_positive() {
            break;
        }
        if lot.quantity() <= remaining {
            slices.push(LotSlice::whole(lot));
            remaining -= lot.quantity();
        } else {
            slices.push(LotSlice::partial(lot, remaining));
            remaining = Decimal::ZERO;
        }
    }

    if remaining.is_positive() {
        return None;
    }
    Some(slices)
}

/// Shares and cost across all lots, used for average-cost guards.
pub fn position_totals(lots: &[TaxLot]) -> (Decimal, Decimal) {
    lots.iter().fold((Decimal::ZERO, Decimal::ZERO), |(s, c), lot| {
        (s + lot.quantity(), c + lot.cost_basis())
    })
}
