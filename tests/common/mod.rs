#![allow(dead_code)]

use chrono::NaiveDate;
use goldencross::domain::backtest::BacktestConfig;
use goldencross::domain::error::GoldenCrossError;
use goldencross::domain::frame::PriceFrame;
pub use goldencross::domain::ohlcv::OhlcvBar;
use goldencross::domain::strategy::StrategyConfig;
use goldencross::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, GoldenCrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(GoldenCrossError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).ok_or_else(|| GoldenCrossError::NoData {
            symbol: symbol.to_string(),
        })?;
        Ok(bars
            .iter()
            .filter(|b| {
                start_date.is_none_or(|s| b.date >= s) && end_date.is_none_or(|e| b.date <= e)
            })
            .cloned()
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, GoldenCrossError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, GoldenCrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(GoldenCrossError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Consecutive daily bars from 2024-01-01 with the given closes and volumes
/// (volume defaults to 1000 past the end of `volumes`).
pub fn bars_from(closes: &[f64], volumes: &[i64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: volumes.get(i).copied().unwrap_or(1000),
        })
        .collect()
}

pub fn frame_from(closes: &[f64]) -> PriceFrame {
    PriceFrame::new("TEST", bars_from(closes, &[]))
}

/// Strictly increasing closes 101, 102, ...
pub fn rising(count: usize) -> Vec<f64> {
    (1..=count).map(|i| 100.0 + i as f64).collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig::default()
}

pub fn windows(short: usize, long: usize, strategy: StrategyConfig) -> BacktestConfig {
    BacktestConfig {
        strategy: StrategyConfig {
            short_window: short,
            long_window: long,
            ..strategy
        },
        ..BacktestConfig::default()
    }
}
