//! RSI (Relative Strength Index) indicator implementation.
//!
//! Simple rolling averages over the trailing `n` close-to-close changes:
//! - avg_gain = mean(max(ΔC, 0)), avg_loss = mean(max(-ΔC, 0))
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined (need n price changes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType, IndicatorValue, rolling_mean};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();
    let gains: Vec<f64> = changes.iter().map(|&c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|&c| (-c).max(0.0)).collect();

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    // changes[i] belongs to bar i + 1; bar 0 never has a value.
    let values = std::iter::once(None).chain(avg_gains.into_iter().zip(avg_losses).map(
        |(gain, loss)| match (gain, loss) {
            (Some(avg_gain), Some(avg_loss)) => Some(IndicatorValue::Simple(rsi_from_averages(
                avg_gain, avg_loss,
            ))),
            _ => None,
        },
    ));

    IndicatorSeries::from_values(IndicatorType::Rsi(period), bars, values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}
