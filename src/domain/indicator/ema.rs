//! Exponential Moving Average indicator.
//!
//! k = 2/(span+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warmup: every bar carries a value once span >= 1.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values: Vec<Option<IndicatorValue>> = if period == 0 {
        vec![None; bars.len()]
    } else {
        ema_values(&closes, period)
            .into_iter()
            .map(|v| Some(IndicatorValue::Simple(v)))
            .collect()
    };
    IndicatorSeries::from_values(IndicatorType::Ema(period), bars, values)
}

/// Recursive EMA over raw values, seeded by the first element.
pub(crate) fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    let Some(&first) = iter.next() else {
        return out;
    };
    let mut ema = first;
    out.push(ema);
    for &v in iter {
        ema = v * k + ema * (1.0 - k);
        out.push(ema);
    }
    out
}
