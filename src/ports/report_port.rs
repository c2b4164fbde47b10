//! Report generation port trait.

use crate::domain::error::GoldenCrossError;
use crate::domain::metrics::PerformanceReport;
use std::path::Path;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, report: &PerformanceReport, output_path: &Path) -> Result<(), GoldenCrossError>;

    /// Default implementation: one `write` per report, suffixing the output
    /// stem with the symbol and strategy.
    ///
    /// The suffixed name always carries an extension, so a dotted symbol
    /// such as `2330.TW` stays part of the stem.
    fn write_many(
        &self,
        reports: &[PerformanceReport],
        output_path: &Path,
    ) -> Result<(), GoldenCrossError> {
        let stem = output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        let extension = output_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "csv".to_string());
        for report in reports {
            let name = format!("{stem}_{}_{}.{extension}", report.symbol, report.strategy);
            self.write(report, &output_path.with_file_name(name))?;
        }
        Ok(())
    }
}
