//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1), so a
//! period below 2 never produces a band.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue, sample_stddev};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let values = (0..bars.len()).map(|i| {
        if period == 0 || i + 1 < period {
            return None;
        }
        let window = &closes[i + 1 - period..=i];
        let middle = window.iter().sum::<f64>() / period as f64;
        let stddev = sample_stddev(window)?;
        Some(IndicatorValue::Bollinger {
            upper: middle + mult * stddev,
            middle,
            lower: middle - mult * stddev,
        })
    });

    IndicatorSeries::from_values(
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        bars,
        values,
    )
}
