//! Tax lots and the slices taken from them during a calculation.

use super::{Decimal, TimeMs};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxLotError {
    #[error("lot quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),
    #[error("cost per share must not be negative, got {0}")]
    NegativeCost(Decimal),
    #[error("price must not be negative, got {0}")]
    NegativePrice(Decimal),
    #[error("split multiple must be at least 1, got {0}")]
    InvalidSplitMultiple(Decimal),
}

/// One open lot of a held security, snapshotted at the last refresh.
///
/// Derived fields (`cost_basis`, `market_value`, gains) are computed once in
/// [`TaxLot::new`]; the type exposes no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxLot {
    open_date: TimeMs,
    quantity: Decimal,
    price: Decimal,
    cost_per_share: Decimal,
    market_value: Decimal,
    cost_basis: Decimal,
    gain_loss_dollar: Decimal,
    gain_loss_pct: Decimal,
    split_multiple: Decimal,
}

impl TaxLot {
    /// Build a lot from its primary fields.
    ///
    /// `price` is the current market price of the security, denormalized
    /// onto every lot. `cost_per_share` must already be split-adjusted;
    /// `split_multiple` records the factor that was applied.
    pub fn new(
        open_date: TimeMs,
        quantity: Decimal,
        price: Decimal,
        cost_per_share: Decimal,
        split_multiple: Decimal,
    ) -> Result<Self, TaxLotError> {
        if !quantity.is_positive() {
            return Err(TaxLotError::NonPositiveQuantity(quantity));
        }
        if cost_per_share.is_negative() {
            return Err(TaxLotError::NegativeCost(cost_per_share));
        }
        if price.is_negative() {
            return Err(TaxLotError::NegativePrice(price));
        }
        if split_multiple < Decimal::ONE {
            return Err(TaxLotError::InvalidSplitMultiple(split_multiple));
        }

        let market_value = quantity * price;
        let cost_basis = quantity * cost_per_share;
        let gain_loss_dollar = market_value - cost_basis;
        let gain_loss_pct = price
            .percent_change_from(cost_per_share)
            .unwrap_or(Decimal::ZERO);

        Ok(Self {
            open_date,
            quantity,
            price,
            cost_per_share,
            market_value,
            cost_basis,
            gain_loss_dollar,
            gain_loss_pct,
            split_multiple,
        })
    }

    pub fn open_date(&self) -> TimeMs {
        self.open_date
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn cost_per_share(&self) -> Decimal {
        self.cost_per_share
    }

    pub fn market_value(&self) -> Decimal {
        self.market_value
    }

    pub fn cost_basis(&self) -> Decimal {
        self.cost_basis
    }

    pub fn gain_loss_dollar(&self) -> Decimal {
        self.gain_loss_dollar
    }

    pub fn gain_loss_pct(&self) -> Decimal {
        self.gain_loss_pct
    }

    pub fn split_multiple(&self) -> Decimal {
        self.split_multiple
    }
}

/// A quantity taken from a [`TaxLot`], whole or partial.
///
/// Slices exist only inside a calculation; the canonical lot list is never
/// touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotSlice {
    pub open_date: TimeMs,
    pub quantity: Decimal,
    pub cost_per_share: Decimal,
    /// Unrealized gain attributable to this slice, prorated by quantity.
    pub gain_loss_dollar: Decimal,
}

impl LotSlice {
    pub fn whole(lot: &TaxLot) -> Self {
        Self {
            open_date: lot.open_date(),
            quantity: lot.quantity(),
            cost_per_share: lot.cost_per_share(),
            gain_loss_dollar: lot.gain_loss_dollar(),
        }
    }

    /// Take `quantity` shares from `lot`, capped at the lot size.
    pub fn partial(lot: &TaxLot, quantity: Decimal) -> Self {
        let quantity = quantity.min(lot.quantity());
        let gain_loss_dollar = quantity * (lot.price() - lot.cost_per_share());
        Self {
            open_date: lot.open_date(),
            quantity,
            cost_per_share: lot.cost_per_share(),
            gain_loss_dollar,
        }
    }

    pub fn cost(&self) -> Decimal {
        self.quantity * self.cost_per_share
    }
}
