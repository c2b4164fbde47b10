//! CSV file data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row naming
//! `date,open,high,low,close,volume` (any order, case-insensitive).

use crate::domain::error::GoldenCrossError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    /// Every bar in the symbol's file, sorted ascending, duplicates rejected.
    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, GoldenCrossError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GoldenCrossError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(GoldenCrossError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| GoldenCrossError::Data {
                reason: format!("{}: CSV header error: {}", path.display(), e),
            })?
            .clone();
        let index = column_index(&headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| GoldenCrossError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            bars.push(parse_record(&record, &index)?);
        }

        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(GoldenCrossError::Data {
                reason: format!("{}: duplicate date {}", path.display(), pair[0].date),
            });
        }
        Ok(bars)
    }
}

fn column_index(headers: &StringRecord) -> Result<[usize; 6], GoldenCrossError> {
    let mut index = [0usize; 6];
    for (slot, name) in index.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| GoldenCrossError::Data {
                reason: format!("missing {name} column"),
            })?;
    }
    Ok(index)
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, GoldenCrossError> {
    record.get(index).ok_or_else(|| GoldenCrossError::Data {
        reason: format!("missing {name} value"),
    })
}

fn parse_price(record: &StringRecord, index: usize, name: &str) -> Result<f64, GoldenCrossError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| GoldenCrossError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}

fn parse_record(record: &StringRecord, index: &[usize; 6]) -> Result<OhlcvBar, GoldenCrossError> {
    let date_str = field(record, index[0], "date")?;
    // Exports often carry a time part; only the leading date matters.
    let date_str = date_str.get(..10).unwrap_or(date_str);
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        GoldenCrossError::Data {
            reason: format!("invalid date format: {e}"),
        }
    })?;

    let volume_str = field(record, index[5], "volume")?;
    let volume = volume_str
        .parse::<i64>()
        .or_else(|_| volume_str.parse::<f64>().map(|v| v as i64))
        .map_err(|e| GoldenCrossError::Data {
            reason: format!("invalid volume value: {e}"),
        })?;

    Ok(OhlcvBar {
        date,
        open: parse_price(record, index[1], "open")?,
        high: parse_price(record, index[2], "high")?,
        low: parse_price(record, index[3], "low")?,
        close: parse_price(record, index[4], "close")?,
        volume,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, GoldenCrossError> {
        let mut bars = self.read_all(symbol)?;
        bars.retain(|b| {
            start_date.is_none_or(|start| b.date >= start)
                && end_date.is_none_or(|end| b.date <= end)
        });
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, GoldenCrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| GoldenCrossError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, GoldenCrossError> {
        let bars = match self.read_all(symbol) {
            Ok(bars) => bars,
            Err(GoldenCrossError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
