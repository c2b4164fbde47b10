//! Strategy configuration and the entry/exit predicates shared by the simulator.
//!
//! Both variants run on the same flat/long state machine; they differ only in
//! the entry filter and the exit conditions checked while long.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::GoldenCrossError;
use crate::domain::signal::Transition;
use crate::domain::trade::ExitReason;

pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_LONG_WINDOW: usize = 20;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_VOLUME_WINDOW: usize = 20;
pub const DEFAULT_STOP_LOSS: f64 = 0.10;
pub const DEFAULT_VOLUME_MULTIPLIER: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Golden cross in, death cross out.
    Crossover,
    /// Golden cross with above-average volume in; death cross or stop-loss out.
    VolumeConfirmed,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Crossover => f.write_str("crossover"),
            StrategyKind::VolumeConfirmed => f.write_str("volume_confirmed"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = GoldenCrossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crossover" | "golden_cross" => Ok(StrategyKind::Crossover),
            "volume_confirmed" | "volume" => Ok(StrategyKind::VolumeConfirmed),
            other => Err(GoldenCrossError::invalid(
                "strategy",
                "kind",
                format!("unknown strategy kind '{other}' (expected crossover or volume_confirmed)"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_period: usize,
    pub volume_window: usize,
    /// Overrides the volume-confirmed default of 10%.
    pub stop_loss_fraction: Option<f64>,
    /// Overrides the volume-confirmed default of 1.2x.
    pub volume_multiplier: Option<f64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::crossover()
    }
}

impl StrategyConfig {
    pub fn crossover() -> Self {
        StrategyConfig {
            kind: StrategyKind::Crossover,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            rsi_period: DEFAULT_RSI_PERIOD,
            volume_window: DEFAULT_VOLUME_WINDOW,
            stop_loss_fraction: None,
            volume_multiplier: None,
        }
    }

    pub fn volume_confirmed() -> Self {
        StrategyConfig {
            kind: StrategyKind::VolumeConfirmed,
            stop_loss_fraction: Some(DEFAULT_STOP_LOSS),
            volume_multiplier: Some(DEFAULT_VOLUME_MULTIPLIER),
            ..Self::crossover()
        }
    }

    pub fn for_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Crossover => Self::crossover(),
            StrategyKind::VolumeConfirmed => Self::volume_confirmed(),
        }
    }

    /// Switch variant, keeping windows and any explicit filter overrides.
    pub fn with_kind(self, kind: StrategyKind) -> Self {
        let defaults = Self::for_kind(kind);
        StrategyConfig {
            kind,
            stop_loss_fraction: self.stop_loss_fraction.or(defaults.stop_loss_fraction),
            volume_multiplier: self.volume_multiplier.or(defaults.volume_multiplier),
            ..self
        }
    }

    /// The longest rolling window the strategy depends on.
    pub fn longest_window(&self) -> usize {
        match self.kind {
            StrategyKind::Crossover => self.long_window,
            StrategyKind::VolumeConfirmed => self.long_window.max(self.volume_window),
        }
    }

    /// Volume threshold multiple, when the variant filters on volume.
    pub fn volume_filter(&self) -> Option<f64> {
        match self.kind {
            StrategyKind::Crossover => None,
            StrategyKind::VolumeConfirmed => {
                Some(self.volume_multiplier.unwrap_or(DEFAULT_VOLUME_MULTIPLIER))
            }
        }
    }

    /// Stop-loss fraction below entry, when the variant carries one.
    pub fn stop_loss(&self) -> Option<f64> {
        match self.kind {
            StrategyKind::Crossover => None,
            StrategyKind::VolumeConfirmed => {
                Some(self.stop_loss_fraction.unwrap_or(DEFAULT_STOP_LOSS))
            }
        }
    }

    /// Entry predicate evaluated while flat.
    ///
    /// An undefined volume average never confirms an entry.
    pub fn should_enter(
        &self,
        transition: Option<Transition>,
        volume: i64,
        volume_ma: Option<f64>,
    ) -> bool {
        if transition != Some(Transition::GoldenCross) {
            return false;
        }
        match self.volume_filter() {
            None => true,
            Some(multiplier) => volume_ma.is_some_and(|avg| volume as f64 > avg * multiplier),
        }
    }

    /// Exit predicate evaluated while long; death cross takes precedence over stop-loss.
    pub fn exit_reason(
        &self,
        transition: Option<Transition>,
        close: f64,
        entry_price: Option<f64>,
    ) -> Option<ExitReason> {
        if transition == Some(Transition::DeathCross) {
            return Some(ExitReason::DeathCross);
        }
        let fraction = self.stop_loss()?;
        let entry = entry_price?;
        (close < entry * (1.0 - fraction)).then_some(ExitReason::StopLoss)
    }
}
