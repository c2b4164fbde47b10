//! Bar sequence for one symbol with derived columns attached by name.
//!
//! Columns are `Vec<Option<f64>>` aligned 1:1 with `bars`. Bars are never
//! modified after construction; indicators only append columns.

use crate::domain::error::GoldenCrossError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, compute_indicator};
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceFrame {
    pub symbol: String,
    bars: Vec<OhlcvBar>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl PriceFrame {
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
            columns: Vec::new(),
        }
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|b| b.date)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Attach or replace a named column. Its length must match the bar count.
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), GoldenCrossError> {
        let name = name.into();
        if values.len() != self.bars.len() {
            return Err(GoldenCrossError::ColumnLength {
                name,
                expected: self.bars.len(),
                actual: values.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
        Ok(())
    }

    pub fn insert_series(&mut self, series: &IndicatorSeries) -> Result<(), GoldenCrossError> {
        for (name, values) in series.columns() {
            self.insert_column(name, values)?;
        }
        Ok(())
    }

    /// Compute each indicator over the bars and attach its columns.
    pub fn with_indicators(
        mut self,
        indicators: &[IndicatorType],
    ) -> Result<Self, GoldenCrossError> {
        for indicator in indicators {
            let series = compute_indicator(&self.bars, indicator);
            self.insert_series(&series)?;
        }
        Ok(self)
    }
}
