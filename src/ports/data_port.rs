//! Data access port trait.

use crate::domain::error::GoldenCrossError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` in ascending date order, bounded inclusively by
    /// `start_date`/`end_date` when given.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, GoldenCrossError>;

    fn list_symbols(&self) -> Result<Vec<String>, GoldenCrossError>;

    /// First date, last date and bar count, or `None` when no data exists.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, GoldenCrossError>;
}
