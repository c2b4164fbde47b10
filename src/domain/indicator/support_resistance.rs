//! Support and resistance levels over a trailing window.
//!
//! Plain levels are min(low) and max(high) of the window. A bar is a pivot
//! high when its high equals the max of the centred 5-bar neighbourhood
//! (wholly inside the window); pivot lows mirror this. When pivots exist,
//! resistance is the mean of the three highest pivot highs and support the
//! mean of the three lowest pivot lows.

use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_WINDOW: usize = 20;
const PIVOT_SPAN: usize = 5;
const PIVOT_TAKE: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
    pub current_price: f64,
}

pub fn calculate_support_resistance(
    bars: &[OhlcvBar],
    window: usize,
) -> Option<SupportResistance> {
    let window = &bars[bars.len().saturating_sub(window)..];
    let current_price = window.last()?.close;

    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();

    let mut pivot_highs = pivots(&highs, |neighbourhood| {
        neighbourhood.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    });
    let mut pivot_lows = pivots(&lows, |neighbourhood| {
        neighbourhood.iter().copied().fold(f64::INFINITY, f64::min)
    });

    let resistance = if pivot_highs.is_empty() {
        highs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    } else {
        pivot_highs.sort_by(|a, b| b.total_cmp(a));
        mean_of_first(&pivot_highs, PIVOT_TAKE)
    };

    let support = if pivot_lows.is_empty() {
        lows.iter().copied().fold(f64::INFINITY, f64::min)
    } else {
        pivot_lows.sort_by(|a, b| a.total_cmp(b));
        mean_of_first(&pivot_lows, PIVOT_TAKE)
    };

    Some(SupportResistance {
        support,
        resistance,
        current_price,
    })
}

/// Values equal to the extreme of their centred neighbourhood.
fn pivots(values: &[f64], extreme: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let half = PIVOT_SPAN / 2;
    if values.len() < PIVOT_SPAN {
        return Vec::new();
    }
    (half..values.len() - half)
        .filter(|&i| values[i] == extreme(&values[i - half..=i + half]))
        .map(|i| values[i])
        .collect()
}

fn mean_of_first(values: &[f64], n: usize) -> f64 {
    let taken = &values[..values.len().min(n)];
    taken.iter().sum::<f64>() / taken.len() as f64
}
