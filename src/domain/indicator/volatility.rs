//! Rolling annualized volatility of close-to-close returns.
//!
//! r[i] = C[i] / C[i-1] - 1
//! VOL(n)[i] = stdev_sample(r[i-n+1..=i]) * sqrt(252)
//! Warmup: first n bars are undefined. A zero previous close leaves the
//! return, and every window containing it, undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue, sample_stddev};
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_volatility(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let returns: Vec<Option<f64>> = bars
        .windows(2)
        .map(|w| (w[0].close != 0.0).then(|| w[1].close / w[0].close - 1.0))
        .collect();

    let values = (0..bars.len()).map(|i| {
        if period == 0 || i < period {
            return None;
        }
        // returns[j] belongs to bar j + 1
        let window: Option<Vec<f64>> = returns[i - period..i].iter().copied().collect();
        let stddev = sample_stddev(&window?)?;
        Some(IndicatorValue::Simple(stddev * TRADING_DAYS_PER_YEAR.sqrt()))
    });

    IndicatorSeries::from_values(IndicatorType::Volatility(period), bars, values)
}

/// Most recent defined annualized volatility.
pub fn latest_volatility(bars: &[OhlcvBar], period: usize) -> Option<f64> {
    calculate_volatility(bars, period).last_simple()
}
