//! INI file configuration adapter.
//!
//! Sections and keys are case-insensitive. Values are trimmed and an empty
//! value reads as unset, so `symbols =` falls through to `symbol`.

use crate::domain::error::GoldenCrossError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Every `[section] key` the backtester reads.
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("data", &["csv_dir"]),
    (
        "backtest",
        &[
            "initial_capital",
            "risk_free_rate",
            "start_date",
            "end_date",
            "symbol",
            "symbols",
        ],
    ),
    (
        "strategy",
        &[
            "kind",
            "short_window",
            "long_window",
            "rsi_period",
            "volume_window",
            "stop_loss",
            "volume_multiplier",
        ],
    ),
];

pub struct FileConfigAdapter {
    source: String,
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GoldenCrossError> {
        let source = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|e| GoldenCrossError::ConfigParse {
            file: source.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(source, &content)
    }

    pub fn from_string(content: &str) -> Result<Self, GoldenCrossError> {
        Self::parse("<inline>".to_string(), content)
    }

    fn parse(source: String, content: &str) -> Result<Self, GoldenCrossError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| GoldenCrossError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        Ok(Self { source, ini })
    }

    /// Where the config came from, for messages.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// `[section] key` entries the backtester never reads, sorted.
    pub fn unknown_keys(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .ini
            .get_map_ref()
            .iter()
            .flat_map(|(section, entries)| {
                let known = KNOWN_KEYS
                    .iter()
                    .find(|(name, _)| *name == section.as_str())
                    .map(|(_, keys)| *keys)
                    .unwrap_or(&[]);
                entries
                    .keys()
                    .filter(move |key| !known.contains(&key.as_str()))
                    .map(move |key| format!("[{section}] {key}"))
            })
            .collect();
        unknown.sort();
        unknown
    }

    fn value(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T: FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.value(section, key)?.parse().ok()
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.value(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed(section, key).unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed(section, key).unwrap_or(default)
    }
}
