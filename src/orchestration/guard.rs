//! Stale-result protection for background recomputation.
//!
//! A result may only be applied while its symbol is still the selected one
//! and its input fingerprint is still the latest observed for that symbol.
//! Cancellation is cooperative: in-flight work runs to completion and is
//! dropped at apply time.

use crate::domain::{Decimal, OptionsSummary, Symbol, TaxLot};
use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// SHA-256 over the inputs a recommendation set depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InputFingerprint(String);

impl InputFingerprint {
    pub fn compute(
        symbol: &Symbol,
        price: Option<Decimal>,
        atr_percent: Option<Decimal>,
        lots: &[TaxLot],
        options: &OptionsSummary,
    ) -> Self {
        use sha2::{Digest, Sha256};

        fn opt(value: Option<Decimal>) -> String {
            value.map(|d| d.to_canonical_string()).unwrap_or_default()
        }

        let mut hasher = Sha256::new();
        hasher.update(symbol.as_str());
        hasher.update(b"|");
        hasher.update(opt(price));
        hasher.update(b"|");
        hasher.update(opt(atr_percent));
        for lot in lots {
            hasher.update(b"|");
            hasher.update(lot.open_date().as_ms().to_le_bytes());
            hasher.update(lot.quantity().to_canonical_string());
            hasher.update(b",");
            hasher.update(lot.cost_per_share().to_canonical_string());
            hasher.update(b",");
            hasher.update(lot.split_multiple().to_canonical_string());
        }
        hasher.update(b"|");
        hasher.update(opt(options.minimum_strike));
        hasher.update(options.contract_count.to_le_bytes());

        InputFingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0[..self.0.len().min(12)])
    }
}

#[derive(Debug, Default)]
struct Selection {
    symbol: Option<Symbol>,
    latest: Option<InputFingerprint>,
}

/// Tracks the selected symbol and the newest inputs seen for it.
#[derive(Debug, Default)]
pub struct SelectionGuard {
    state: Mutex<Selection>,
}

impl SelectionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Selection> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `symbol` current. Returns whether the selection changed.
    pub fn select(&self, symbol: Symbol) -> bool {
        let mut state = self.state();
        if state.symbol.as_ref() == Some(&symbol) {
            return false;
        }
        state.symbol = Some(symbol);
        state.latest = None;
        true
    }

    pub fn selected(&self) -> Option<Symbol> {
        self.state().symbol.clone()
    }

    /// Record inputs about to be computed. Ignored unless `symbol` is
    /// selected.
    pub fn observe(&self, symbol: &Symbol, fingerprint: &InputFingerprint) {
        let mut state = self.state();
        if state.symbol.as_ref() == Some(symbol) {
            state.latest = Some(fingerprint.clone());
        }
    }

    /// Whether a result computed from `fingerprint` for `symbol` may still
    /// be applied.
    pub fn is_current(&self, symbol: &Symbol, fingerprint: &InputFingerprint) -> bool {
        let state = self.state();
        state.symbol.as_ref() == Some(symbol) && state.latest.as_ref() == Some(fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeMs;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn fingerprint(symbol: &str, price: &str) -> InputFingerprint {
        let lots = vec![TaxLot::new(TimeMs::new(1), d("10"), d(price), d("18"), Decimal::ONE).unwrap()];
        InputFingerprint::compute(
            &Symbol::new(symbol),
            Some(d(price)),
            Some(d("2.5")),
            &lots,
            &OptionsSummary::default(),
        )
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint("INTC", "20"), fingerprint("INTC", "20"));
        assert_eq!(fingerprint("INTC", "20").as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_inputs() {
        assert_ne!(fingerprint("INTC", "20"), fingerprint("INTC", "20.01"));
        assert_ne!(fingerprint("INTC", "20"), fingerprint("AAPL", "20"));
    }

    #[test]
    fn test_fingerprint_ignores_decimal_scale() {
        assert_eq!(fingerprint("INTC", "20"), fingerprint("INTC", "20.00"));
    }

    #[test]
    fn test_result_for_current_inputs_is_applied() {
        let guard = SelectionGuard::new();
        let intc = Symbol::new("INTC");
        let fp = fingerprint("INTC", "20");

        assert!(guard.select(intc.clone()));
        guard.observe(&intc, &fp);
        assert!(guard.is_current(&intc, &fp));
    }

    #[test]
    fn test_result_for_previous_symbol_is_stale() {
        let guard = SelectionGuard::new();
        let intc = Symbol::new("INTC");
        let fp = fingerprint("INTC", "20");

        guard.select(intc.clone());
        guard.observe(&intc, &fp);
        guard.select(Symbol::new("AAPL"));

        assert!(!guard.is_current(&intc, &fp));
    }

    #[test]
    fn test_result_for_superseded_inputs_is_stale() {
        let guard = SelectionGuard::new();
        let intc = Symbol::new("INTC");
        let old = fingerprint("INTC", "20");
        let new = fingerprint("INTC", "21");

        guard.select(intc.clone());
        guard.observe(&intc, &old);
        guard.observe(&intc, &new);

        assert!(!guard.is_current(&intc, &old));
        assert!(guard.is_current(&intc, &new));
    }

    #[test]
    fn test_reselecting_same_symbol_keeps_inputs() {
        let guard = SelectionGuard::new();
        let intc = Symbol::new("INTC");
        let fp = fingerprint("INTC", "20");

        guard.select(intc.clone());
        guard.observe(&intc, &fp);
        assert!(!guard.select(intc.clone()));
        assert!(guard.is_current(&intc, &fp));
    }

    #[test]
    fn test_observe_ignores_unselected_symbol() {
        let guard = SelectionGuard::new();
        let aapl = Symbol::new("AAPL");
        let fp = fingerprint("AAPL", "20");
        guard.select(Symbol::new("INTC"));
        guard.observe(&aapl, &fp);
        assert!(!guard.is_current(&aapl, &fp));
    }
}
