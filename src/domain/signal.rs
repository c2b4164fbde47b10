//! Moving-average crossover state and transitions.
//!
//! `above[t]` is `short[t] > long[t]`, undefined where either input is
//! undefined. Transitions compare consecutive states numerically with an
//! undefined state counting as "not above", so the undefined head of a series
//! never fires, while the first bar where both averages exist and the short
//! one leads is a golden cross. `transition[0]` is always undefined.

use chrono::NaiveDate;

use crate::domain::indicator::calculate_sma;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    GoldenCross,
    DeathCross,
    Unchanged,
}

impl Transition {
    fn from_states(previous: bool, current: bool) -> Self {
        match i8::from(current) - i8::from(previous) {
            1 => Transition::GoldenCross,
            -1 => Transition::DeathCross,
            _ => Transition::Unchanged,
        }
    }

    /// +1 golden cross, -1 death cross, 0 otherwise.
    pub fn as_delta(self) -> i8 {
        match self {
            Transition::GoldenCross => 1,
            Transition::DeathCross => -1,
            Transition::Unchanged => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossoverSignals {
    pub above: Vec<Option<bool>>,
    pub transitions: Vec<Option<Transition>>,
}

impl CrossoverSignals {
    pub fn len(&self) -> usize {
        self.above.len()
    }

    pub fn is_empty(&self) -> bool {
        self.above.is_empty()
    }

    pub fn transition(&self, index: usize) -> Option<Transition> {
        self.transitions.get(index).copied().flatten()
    }

    pub fn is_golden_cross(&self, index: usize) -> bool {
        self.transition(index) == Some(Transition::GoldenCross)
    }

    pub fn is_death_cross(&self, index: usize) -> bool {
        self.transition(index) == Some(Transition::DeathCross)
    }
}

pub fn detect_crossovers(short: &[Option<f64>], long: &[Option<f64>]) -> CrossoverSignals {
    let above: Vec<Option<bool>> = short
        .iter()
        .zip(long)
        .map(|(s, l)| Some(s.as_ref()? > l.as_ref()?))
        .collect();

    let transitions = std::iter::once(None)
        .chain(above.windows(2).map(|w| {
            Some(Transition::from_states(
                w[0].unwrap_or(false),
                w[1].unwrap_or(false),
            ))
        }))
        .take(above.len())
        .collect();

    CrossoverSignals { above, transitions }
}

/// Crossover signals for SMA(short_window) against SMA(long_window) of close.
pub fn ma_crossovers(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
) -> CrossoverSignals {
    let short = calculate_sma(bars, short_window).simple_values();
    let long = calculate_sma(bars, long_window).simple_values();
    detect_crossovers(&short, &long)
}

pub fn golden_cross_dates(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
) -> Vec<NaiveDate> {
    cross_dates(bars, short_window, long_window, Transition::GoldenCross)
}

pub fn death_cross_dates(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
) -> Vec<NaiveDate> {
    cross_dates(bars, short_window, long_window, Transition::DeathCross)
}

fn cross_dates(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
    wanted: Transition,
) -> Vec<NaiveDate> {
    let signals = ma_crossovers(bars, short_window, long_window);
    bars.iter()
        .enumerate()
        .filter(|&(i, _)| signals.transition(i) == Some(wanted))
        .map(|(_, bar)| bar.date)
        .collect()
}
