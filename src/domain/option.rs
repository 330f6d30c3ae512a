//! Option contracts held against an underlying, and the summary the buy
//! ladder anchors on.

use super::{Decimal, Symbol};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PutCall {
    Put,
    Call,
}

impl fmt::Display for PutCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutCall::Put => write!(f, "P"),
            PutCall::Call => write!(f, "C"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionSymbolError {
    #[error("option symbol too short: {0:?}")]
    TooShort(String),
    #[error("invalid expiration in option symbol: {0:?}")]
    InvalidExpiration(String),
    #[error("invalid put/call flag in option symbol: {0:?}")]
    InvalidPutCall(String),
    #[error("invalid strike in option symbol: {0:?}")]
    InvalidStrike(String),
}

/// A parsed OCC option symbol, e.g. `"INTC  250516C00025000"`.
///
/// Layout: root (space padded to six characters, padding optional),
/// expiration `YYMMDD`, `C` or `P`, then the strike × 1000 in eight digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSymbol {
    pub root: Symbol,
    pub expiration: NaiveDate,
    pub put_call: PutCall,
    pub strike: Decimal,
}

const SUFFIX_LEN: usize = 6 + 1 + 8;

impl FromStr for OptionSymbol {
    type Err = OptionSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || s.len() <= SUFFIX_LEN {
            return Err(OptionSymbolError::TooShort(s.to_string()));
        }
        let (root, suffix) = s.split_at(s.len() - SUFFIX_LEN);
        let root = root.trim();
        if root.is_empty() {
            return Err(OptionSymbolError::TooShort(s.to_string()));
        }

        let (date, rest) = suffix.split_at(6);
        let (flag, strike) = rest.split_at(1);

        let expiration = NaiveDate::parse_from_str(date, "%y%m%d")
            .map_err(|_| OptionSymbolError::InvalidExpiration(s.to_string()))?;
        let put_call = match flag {
            "C" | "c" => PutCall::Call,
            "P" | "p" => PutCall::Put,
            _ => return Err(OptionSymbolError::InvalidPutCall(s.to_string())),
        };
        if !strike.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OptionSymbolError::InvalidStrike(s.to_string()));
        }
        let strike_milli: i64 = strike
            .parse()
            .map_err(|_| OptionSymbolError::InvalidStrike(s.to_string()))?;

        Ok(Self {
            root: Symbol::new(root),
            expiration,
            put_call,
            strike: Decimal::scaled(strike_milli, 3),
        })
    }
}

impl fmt::Display for OptionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strike_milli = (self.strike * Decimal::from(1000i64))
            .round_dp(0)
            .to_u32()
            .unwrap_or(0);
        write!(
            f,
            "{:<6}{}{}{:08}",
            self.root.as_str(),
            self.expiration.format("%y%m%d"),
            self.put_call,
            strike_milli
        )
    }
}

/// An option position as reported by the brokerage.
///
/// Negative `quantity` means the contract was written (sold to open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPosition {
    pub symbol: String,
    pub underlying: Symbol,
    pub quantity: Decimal,
}

impl OptionPosition {
    pub fn parsed(&self) -> Result<OptionSymbol, OptionSymbolError> {
        self.symbol.parse()
    }
}

/// What the buy ladder needs to know about options on one underlying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSummary {
    pub minimum_strike: Option<Decimal>,
    pub minimum_days_to_expiration: Option<i64>,
    pub contract_count: usize,
}

impl OptionsSummary {
    /// Summarize the positions on `underlying` as of `today`.
    ///
    /// Every position on the underlying counts as one contract; positions
    /// whose symbol does not parse still count but contribute no strike or
    /// expiration.
    pub fn from_positions(underlying: &Symbol, positions: &[OptionPosition], today: NaiveDate) -> Self {
        let mut summary = OptionsSummary::default();

        for position in positions.iter().filter(|p| &p.underlying == underlying) {
            summary.contract_count += 1;

            let Ok(parsed) = position.parsed() else {
                tracing::debug!(symbol = %position.symbol, "unparseable option symbol");
                continue;
            };

            summary.minimum_strike = Some(match summary.minimum_strike {
                Some(current) => current.min(parsed.strike),
                None => parsed.strike,
            });

            let dte = (parsed.expiration - today).num_days();
            summary.minimum_days_to_expiration = Some(match summary.minimum_days_to_expiration {
                Some(current) => current.min(dte),
                None => dte,
            });
        }

        summary
    }
}
