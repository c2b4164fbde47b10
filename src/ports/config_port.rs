//! Configuration access port trait.

use std::path::PathBuf;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;

    /// Uppercased `[backtest] symbols` list, else the single `[backtest] symbol`.
    fn symbols(&self) -> Vec<String> {
        if let Some(list) = self.get_string("backtest", "symbols") {
            return list
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        self.get_string("backtest", "symbol")
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .into_iter()
            .collect()
    }

    fn csv_dir(&self) -> Option<PathBuf> {
        self.get_string("data", "csv_dir").map(PathBuf::from)
    }
}
