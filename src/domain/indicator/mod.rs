//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//!
//! Every calculation is a pure function of the bar slice. Points inside the
//! warmup window carry `value: None` rather than a numeric placeholder.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod support_resistance;
pub mod trend;
pub mod volatility;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::{calculate_sma, calculate_volume_sma};
pub use volatility::calculate_volatility;

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    VolumeSma(usize),
    Ema(usize),
    Rsi(usize),
    Volatility(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Names of the frame columns this indicator produces, in output order.
    pub fn column_names(&self) -> Vec<String> {
        match self {
            IndicatorType::Sma(period) => vec![format!("MA{period}")],
            IndicatorType::VolumeSma(_) => vec!["Volume_MA".to_string()],
            IndicatorType::Ema(period) => vec![format!("EMA{period}")],
            IndicatorType::Rsi(_) => vec!["RSI".to_string()],
            IndicatorType::Volatility(_) => vec!["Volatility".to_string()],
            IndicatorType::Macd { .. } => vec![
                "MACD".to_string(),
                "MACD_Signal".to_string(),
                "MACD_Histogram".to_string(),
            ],
            IndicatorType::Bollinger { .. } => vec![
                "BB_Upper".to_string(),
                "BB_Middle".to_string(),
                "BB_Lower".to_string(),
            ],
        }
    }

    /// Number of leading bars that can never carry a value.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(p)
            | IndicatorType::VolumeSma(p)
            | IndicatorType::Bollinger { period: p, .. } => p.saturating_sub(1),
            IndicatorType::Rsi(p) | IndicatorType::Volatility(p) => *p,
            IndicatorType::Ema(_) | IndicatorType::Macd { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn from_values(
        indicator_type: IndicatorType,
        bars: &[OhlcvBar],
        values: impl IntoIterator<Item = Option<IndicatorValue>>,
    ) -> Self {
        let values = bars
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                date: bar.date,
                value,
            })
            .collect();
        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index` for single-valued indicators.
    pub fn simple(&self, index: usize) -> Option<f64> {
        match self.values.get(index)?.value {
            Some(IndicatorValue::Simple(v)) => Some(v),
            _ => None,
        }
    }

    /// The whole series as a single column; multi-valued points map to `None`.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        (0..self.values.len()).map(|i| self.simple(i)).collect()
    }

    /// Last defined single value.
    pub fn last_simple(&self) -> Option<f64> {
        (0..self.values.len()).rev().find_map(|i| self.simple(i))
    }

    /// Split into named columns aligned with the input bars.
    pub fn columns(&self) -> Vec<(String, Vec<Option<f64>>)> {
        let names = self.indicator_type.column_names();
        let width = names.len();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(self.values.len()); width];

        for point in &self.values {
            let parts: Vec<Option<f64>> = match point.value {
                None => vec![None; width],
                Some(IndicatorValue::Simple(v)) => vec![Some(v)],
                Some(IndicatorValue::Macd {
                    line,
                    signal,
                    histogram,
                }) => vec![Some(line), Some(signal), Some(histogram)],
                Some(IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                }) => vec![Some(upper), Some(middle), Some(lower)],
            };
            for (column, part) in columns.iter_mut().zip(parts) {
                column.push(part);
            }
        }

        names.into_iter().zip(columns).collect()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOLUME_SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Volatility(period) => write!(f, "VOLATILITY({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// Dispatch a single indicator calculation.
pub fn compute_indicator(bars: &[OhlcvBar], indicator: &IndicatorType) -> IndicatorSeries {
    match *indicator {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::VolumeSma(period) => calculate_volume_sma(bars, period),
        IndicatorType::Ema(period) => calculate_ema(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::Volatility(period) => calculate_volatility(bars, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

/// Arithmetic mean of each trailing `window` values; `None` until the window fills.
pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Sample standard deviation (n - 1 divisor); `None` for fewer than two values.
pub(crate) fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
