//! CSV report adapter.
//!
//! Writes `<stem>_trades.csv` (the trade log) and `<stem>_equity.csv` (bars,
//! derived columns and portfolio value) next to the requested output path.

use crate::domain::error::GoldenCrossError;
use crate::domain::metrics::PerformanceReport;
use crate::ports::report_port::ReportPort;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }

    pub fn output_paths(output_path: &Path) -> (PathBuf, PathBuf) {
        let stem = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        (
            output_path.with_file_name(format!("{stem}_trades.csv")),
            output_path.with_file_name(format!("{stem}_equity.csv")),
        )
    }

    fn write_trades(report: &PerformanceReport, path: &Path) -> Result<(), GoldenCrossError> {
        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        wtr.write_record(["date", "action", "price", "shares", "cash_delta", "reason"])
            .map_err(csv_error)?;
        for trade in &report.trades {
            wtr.write_record([
                trade.date.to_string(),
                trade.action.to_string(),
                format!("{:.4}", trade.price),
                trade.shares.to_string(),
                format!("{:.2}", trade.cash_delta),
                trade.reason.map(|r| r.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_equity(report: &PerformanceReport, path: &Path) -> Result<(), GoldenCrossError> {
        let frame = &report.frame;
        let names: Vec<&str> = frame.column_names().collect();
        let columns: Vec<&[Option<f64>]> = names.iter().filter_map(|n| frame.column(n)).collect();

        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        let mut header = vec!["date", "open", "high", "low", "close", "volume"];
        header.extend(names.iter().copied());
        wtr.write_record(&header).map_err(csv_error)?;

        for (i, bar) in frame.bars().iter().enumerate() {
            let mut row = vec![
                bar.date.to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ];
            row.extend(
                columns
                    .iter()
                    .map(|col| col[i].map(|v| format!("{v:.4}")).unwrap_or_default()),
            );
            wtr.write_record(&row).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> GoldenCrossError {
    GoldenCrossError::Data {
        reason: format!("CSV write error: {e}"),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &PerformanceReport,
        output_path: &Path,
    ) -> Result<(), GoldenCrossError> {
        let (trades_path, equity_path) = Self::output_paths(output_path);
        Self::write_trades(report, &trades_path)?;
        Self::write_equity(report, &equity_path)?;
        Ok(())
    }
}
