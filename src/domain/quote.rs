use super::{Decimal, Symbol};
use serde::{Deserialize, Serialize};

/// Latest quote for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: Symbol,
    pub last_price: Option<Decimal>,
    pub extended_last_price: Option<Decimal>,
    pub regular_market_last_price: Option<Decimal>,
}

impl Quote {
    /// Best available price for `symbol`.
    ///
    /// Returns `None` when the quote belongs to another symbol. Prefers the
    /// last trade, then the extended-hours last, then the regular-session
    /// last; non-positive prices are treated as missing.
    pub fn price_for(&self, symbol: &Symbol) -> Option<Decimal> {
        if &self.symbol != symbol {
            return None;
        }
        [
            self.last_price,
            self.extended_last_price,
            self.regular_market_last_price,
        ]
        .into_iter()
        .flatten()
        .find(Decimal::is_positive)
    }
}
