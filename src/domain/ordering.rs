//! Stable lot ordering for deterministic processing.

use crate::domain::{Decimal, TaxLot};
use std::cmp::Ordering;

/// Ordering key for "worst basis first" consumption.
///
/// Ordering: cost per share descending -> original position ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotOrderingKey {
    pub cost_per_share: Decimal,
    pub position: usize,
}

impl LotOrderingKey {
    pub fn new(lot: &TaxLot, position: usize) -> Self {
        LotOrderingKey {
            cost_per_share: lot.cost_per_share(),
            position,
        }
    }
}

impl Ord for LotOrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost_per_share
            .cmp(&self.cost_per_share)
            .then(self.position.cmp(&other.position))
    }
}

impl PartialOrd for LotOrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Copy of `lots` sorted most expensive first, ties kept in input order.
pub fn sort_lots_by_cost_desc(lots: &[TaxLot]) -> Vec<TaxLot> {
    let mut keyed: Vec<(LotOrderingKey, &TaxLot)> = lots
        .iter()
        .enumerate()
        .map(|(i, lot)| (LotOrderingKey::new(lot, i), lot))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, lot)| lot.clone()).collect()
}
