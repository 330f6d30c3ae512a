//! Pure, synchronous recommendation calculators.
//!
//! Nothing in here performs I/O or holds state; every function returns an
//! empty or `None` result when no recommendation is possible.

pub mod aggregator;
pub mod atr;
pub mod buy_percent;
pub mod buy_sequence;
pub mod clock;
pub mod fixed_sell;
pub mod sell_ladder;
pub mod single_buy;

pub use aggregator::{position_totals, running_totals, take_shares, RunningTotal};
pub use atr::{atr_percent, average_true_range, DEFAULT_ATR_PERIOD};
pub use buy_percent::{percent_buys, percent_target_gain, target_price_for_gain};
pub use buy_sequence::{buy_sequence, ladder_trailing_stop, redistribute_trailing_stops};
pub use clock::{Clock, FixedClock, SystemClock};
pub use fixed_sell::{
    max_shares, min_atr, min_atr_required_profit, min_break_even, one_percent_trailing_stop, top_100,
};
pub use sell_ladder::sell_ladder;
pub use single_buy::{shares_to_buy, single_buy, target_gain_percent};
