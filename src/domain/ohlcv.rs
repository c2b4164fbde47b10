//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Day-over-day move of the latest close.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub current_price: f64,
    pub previous_price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl PriceChange {
    /// Compares the last two closes; `None` with fewer than two bars.
    pub fn from_bars(bars: &[OhlcvBar]) -> Option<Self> {
        let [.., previous, current] = bars else {
            return None;
        };
        Some(PriceChange {
            current_price: current.close,
            previous_price: previous.close,
            change: current.close - previous.close,
            change_percent: percentage_change(previous.close, current.close),
        })
    }
}

/// (new - old) / old * 100, or 0 when `old` is zero.
pub fn percentage_change(old_value: f64, new_value: f64) -> f64 {
    if old_value == 0.0 {
        return 0.0;
    }
    (new_value - old_value) / old_value * 100.0
}
