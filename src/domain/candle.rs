use super::{Decimal, TimeMs};
use serde::{Deserialize, Serialize};

/// One daily OHLC bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub time: TimeMs,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    /// True range against the previous close: the widest of high−low,
    /// |high − prev_close| and |low − prev_close|.
    pub fn true_range(&self, prev_close: Option<Decimal>) -> Decimal {
        let range = self.high - self.low;
        match prev_close {
            Some(prev) => range
                .max((self.high - prev).abs())
                .max((self.low - prev).abs()),
            None => range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: i64, low: i64, close: i64) -> Candle {
        Candle {
            time: TimeMs::new(0),
            open: Decimal::from(low),
            high: Decimal::from(high),
            low: Decimal::from(low),
            close: Decimal::from(close),
        }
    }

    #[test]
    fn test_true_range_without_previous_close() {
        assert_eq!(candle(12, 10, 11).true_range(None), Decimal::from(2i64));
    }

    #[test]
    fn test_true_range_gap_up() {
        // previous close 8, bar 12-10: |12 - 8| dominates
        assert_eq!(
            candle(12, 10, 11).true_range(Some(Decimal::from(8i64))),
            Decimal::from(4i64)
        );
    }

    #[test]
    fn test_true_range_gap_down() {
        assert_eq!(
            candle(12, 10, 11).true_range(Some(Decimal::from(15i64))),
            Decimal::from(5i64)
        );
    }
}
