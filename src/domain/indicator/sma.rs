//! Simple Moving Average of close and of volume.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue, rolling_mean};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    IndicatorSeries::from_values(
        IndicatorType::Sma(period),
        bars,
        rolling_mean(&closes, period)
            .into_iter()
            .map(|v| v.map(IndicatorValue::Simple)),
    )
}

pub fn calculate_volume_sma(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
    IndicatorSeries::from_values(
        IndicatorType::VolumeSma(period),
        bars,
        rolling_mean(&volumes, period)
            .into_iter()
            .map(|v| v.map(IndicatorValue::Simple)),
    )
}
