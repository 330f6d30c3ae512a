//! Single buy recommendation sized to pull the average cost toward a
//! price that implies the target gain.

use crate::domain::{BuyRecommendation, Decimal, Symbol};
use chrono::{Duration, NaiveDateTime};

const MIN_TARGET_GAIN_PERCENT: Decimal = Decimal::scaled(15, 0);
pub(crate) const TARGET_GAIN_PER_ATR: Decimal = Decimal::scaled(7, 0);
/// Orders priced above this are capped, and so is their total cost.
const MAX_ORDER_COST: Decimal = Decimal::scaled(500, 0);
const SUBMIT_FORMAT: &str = "%-m/%-d/%y %H:%M:%S";

/// `max(15, 7 × atr)`.
pub fn target_gain_percent(atr_percent: Decimal) -> Decimal {
    MIN_TARGET_GAIN_PERCENT.max(TARGET_GAIN_PER_ATR * atr_percent)
}

/// Unclamped share count:
/// `ceil(((S × tbp − C) / (0.01 × tg) − C) / tbp)`.
pub fn shares_to_buy(
    total_shares: Decimal,
    total_cost: Decimal,
    target_buy_price: Decimal,
    target_gain_percent: Decimal,
) -> Option<Decimal> {
    let scaled = (total_shares * target_buy_price - total_cost).checked_div(target_gain_percent.pct())?;
    Some((scaled - total_cost).checked_div(target_buy_price)?.ceil())
}

/// Apply the order-size cap and the one-share floor.
fn clamp_shares(shares: Decimal, target_buy_price: Decimal) -> Decimal {
    let clamped = if target_buy_price > MAX_ORDER_COST {
        Decimal::ONE
    } else if shares * target_buy_price > MAX_ORDER_COST {
        MAX_ORDER_COST
            .checked_div(target_buy_price)
            .map(|n| n.floor())
            .unwrap_or(Decimal::ONE)
    } else {
        shares
    };
    clamped.max(Decimal::ONE)
}

/// Next calendar day at 09:40, formatted `M/d/yy HH:mm:ss`.
pub fn next_submit_time(now: NaiveDateTime) -> String {
    (now.date() + Duration::days(1))
        .and_hms_opt(9, 40, 0)
        .map(|submit| submit.format(SUBMIT_FORMAT).to_string())
        .unwrap_or_default()
}

/// One buy order, or `None` when the position already meets its target gain
/// or holds nothing to average against.
pub fn single_buy(
    symbol: &Symbol,
    current_price: Decimal,
    average_cost: Decimal,
    total_shares: Decimal,
    atr_percent: Decimal,
    now: NaiveDateTime,
) -> Option<BuyRecommendation> {
    if !total_shares.is_positive() || !average_cost.is_positive() {
        return None;
    }

    let current_gain = current_price.percent_change_from(average_cost)?;
    let target_gain = target_gain_percent(atr_percent);
    if current_gain >= target_gain {
        tracing::debug!(%symbol, %current_gain, %target_gain, "already at target gain, no buy");
        return None;
    }

    let target = average_cost * (Decimal::ONE + target_gain.pct());
    let entry = target * (Decimal::ONE + atr_percent.pct());
    let target_buy_price = entry * (Decimal::ONE + atr_percent.pct());

    let total_cost = average_cost * total_shares;
    let raw = shares_to_buy(total_shares, total_cost, target_buy_price, target_gain)?;
    let shares = clamp_shares(raw, target_buy_price).to_u32()?;
    let order_cost = Decimal::from(shares) * target_buy_price;
    let submit_date = next_submit_time(now);

    let description = format!(
        "BUY {} {} Submit: {} BID >= {:.2}, TS = {:.1}%, Target: {:.2}",
        shares, symbol, submit_date, entry, atr_percent, target_buy_price
    );

    Some(BuyRecommendation {
        shares,
        target_buy_price,
        entry_price: entry,
        trailing_stop_percent: atr_percent,
        target_gain_percent: target_gain,
        current_gain_percent: current_gain,
        order_cost,
        submit_date,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn new_years_afternoon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_target_gain_percent() {
        assert_eq!(target_gain_percent(d("4.0")), d("28"));
        assert_eq!(target_gain_percent(d("1.0")), d("15"));
    }

    #[test]
    fn test_shares_to_buy_calibration() {
        let n = shares_to_buy(d("359"), d("3445.18"), d("16.84"), d("54.88")).unwrap();
        assert_eq!(n, d("77"));
    }

    #[test]
    fn test_shares_to_buy_zero_gain_is_none() {
        assert_eq!(shares_to_buy(d("10"), d("100"), d("11"), Decimal::ZERO), None);
    }

    #[test]
    fn test_single_buy_clamped_by_order_cost() {
        let rec = single_buy(
            &Symbol::new("INTC"),
            d("19"),
            d("20"),
            d("100"),
            d("2"),
            new_years_afternoon(),
        )
        .unwrap();

        assert_eq!(rec.target_gain_percent, d("15"));
        assert_eq!(rec.current_gain_percent, d("-5"));
        assert_eq!(rec.entry_price, d("23.46"));
        assert_eq!(rec.target_buy_price, d("23.9292"));
        // 26 unclamped, 26 × 23.93 > 500
        assert_eq!(rec.shares, 20);
        assert_eq!(rec.order_cost, d("478.584"));
        assert_eq!(rec.trailing_stop_percent, d("2"));
        assert_eq!(rec.submit_date, "1/2/25 09:40:00");
        assert_eq!(
            rec.description,
            "BUY 20 INTC Submit: 1/2/25 09:40:00 BID >= 23.46, TS = 2.0%, Target: 23.93"
        );
    }

    #[test]
    fn test_single_buy_expensive_stock_buys_one_share() {
        let rec = single_buy(
            &Symbol::new("AVGO"),
            d("590"),
            d("600"),
            d("10"),
            d("1"),
            new_years_afternoon(),
        )
        .unwrap();
        assert_eq!(rec.shares, 1);
    }

    #[test]
    fn test_no_buy_when_target_gain_met() {
        // average 9.60 against 15.62 is ~63% profit
        let rec = single_buy(
            &Symbol::new("INTC"),
            d("15.62"),
            d("9.5966"),
            d("359"),
            d("2"),
            new_years_afternoon(),
        );
        assert_eq!(rec, None);
    }

    #[test]
    fn test_no_buy_without_position() {
        let now = new_years_afternoon();
        let sym = Symbol::new("INTC");
        assert_eq!(single_buy(&sym, d("19"), d("20"), Decimal::ZERO, d("2"), now), None);
        assert_eq!(single_buy(&sym, d("19"), Decimal::ZERO, d("10"), d("2"), now), None);
    }

    #[test]
    fn test_submit_time_rolls_month() {
        let now = NaiveDate::from_ymd_opt(2025, 7, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(next_submit_time(now), "8/1/25 09:40:00");
    }
}
