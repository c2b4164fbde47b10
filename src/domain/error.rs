//! Domain error types.
//!
//! Degenerate-but-valid inputs (short series, zero trades, zero volatility)
//! are not errors; only structurally invalid input and I/O or config
//! failures surface here.

/// Top-level error type for goldencross.
#[derive(Debug, thiserror::Error)]
pub enum GoldenCrossError {
    #[error("empty input: no bars to backtest")]
    EmptyInput,

    #[error("column {name} has {actual} values, frame has {expected} bars")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GoldenCrossError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        GoldenCrossError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&GoldenCrossError> for std::process::ExitCode {
    fn from(err: &GoldenCrossError) -> Self {
        let code: u8 = match err {
            GoldenCrossError::Io(_) => 1,
            GoldenCrossError::ConfigParse { .. }
            | GoldenCrossError::ConfigMissing { .. }
            | GoldenCrossError::ConfigInvalid { .. } => 2,
            GoldenCrossError::Data { .. } | GoldenCrossError::ColumnLength { .. } => 3,
            GoldenCrossError::NoData { .. } | GoldenCrossError::EmptyInput => 5,
        };
        std::process::ExitCode::from(code)
    }
}
