//! Price and volume trend snapshot at the latest bar.

use std::fmt;

use crate::domain::indicator::calculate_sma;
use crate::domain::ohlcv::OhlcvBar;

const VOLUME_LOOKBACK: usize = 20;
const VOLUME_EXPANDING: f64 = 1.5;
const VOLUME_CONTRACTING: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTrend {
    StrongUptrend,
    Uptrend,
    StrongDowntrend,
    Downtrend,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTrend {
    Expanding,
    Contracting,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendAnalysis {
    pub price_trend: PriceTrend,
    pub volume_trend: VolumeTrend,
}

impl fmt::Display for PriceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriceTrend::StrongUptrend => "strong uptrend",
            PriceTrend::Uptrend => "uptrend",
            PriceTrend::StrongDowntrend => "strong downtrend",
            PriceTrend::Downtrend => "downtrend",
            PriceTrend::Sideways => "sideways",
        };
        f.write_str(label)
    }
}

impl fmt::Display for VolumeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VolumeTrend::Expanding => "volume expanding",
            VolumeTrend::Contracting => "volume contracting",
            VolumeTrend::Normal => "volume normal",
        };
        f.write_str(label)
    }
}

/// Classify the last bar against its short/long moving averages and recent volume.
///
/// Undefined averages compare false, so a series shorter than the long window
/// reads as sideways.
pub fn analyze_trend(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
) -> Option<TrendAnalysis> {
    let latest = bars.last()?;
    let last = bars.len() - 1;
    let short = calculate_sma(bars, short_window).simple(last);
    let long = calculate_sma(bars, long_window).simple(last);

    let close = latest.close;
    let price_trend = match (short, long) {
        (Some(s), Some(l)) if close > l && l > s => PriceTrend::StrongUptrend,
        (_, Some(l)) if close > l => PriceTrend::Uptrend,
        (Some(s), Some(l)) if close < l && l < s => PriceTrend::StrongDowntrend,
        (_, Some(l)) if close < l => PriceTrend::Downtrend,
        _ => PriceTrend::Sideways,
    };

    let recent = &bars[bars.len().saturating_sub(VOLUME_LOOKBACK)..];
    let avg_volume = recent.iter().map(|b| b.volume as f64).sum::<f64>() / recent.len() as f64;
    let volume = latest.volume as f64;
    let volume_trend = if volume > avg_volume * VOLUME_EXPANDING {
        VolumeTrend::Expanding
    } else if volume < avg_volume * VOLUME_CONTRACTING {
        VolumeTrend::Contracting
    } else {
        VolumeTrend::Normal
    };

    Some(TrendAnalysis {
        price_trend,
        volume_trend,
    })
}
