//! Configuration validation.
//!
//! Validates config fields before a backtest runs. Keys that are absent fall
//! back to defaults and pass; keys that are present must be well formed.

use crate::domain::error::GoldenCrossError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    validate_kind(config)?;
    validate_windows(config)?;
    validate_stop_loss(config)?;
    validate_volume_multiplier(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    let value = config.get_double("backtest", "initial_capital", 100_000.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(GoldenCrossError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.01);
    if !(0.0..1.0).contains(&value) {
        return Err(GoldenCrossError::invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(GoldenCrossError::invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

/// Parse an optional `[backtest]` date key.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, GoldenCrossError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                GoldenCrossError::invalid(
                    "backtest",
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

fn validate_kind(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    if let Some(kind) = config.get_string("strategy", "kind") {
        kind.parse::<StrategyKind>()?;
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    for (key, default) in [
        ("short_window", 5),
        ("long_window", 20),
        ("rsi_period", 14),
        ("volume_window", 20),
    ] {
        if config.get_int("strategy", key, default) < 1 {
            return Err(GoldenCrossError::invalid(
                "strategy",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }

    let short = config.get_int("strategy", "short_window", 5);
    let long = config.get_int("strategy", "long_window", 20);
    if short >= long {
        return Err(GoldenCrossError::invalid(
            "strategy",
            "long_window",
            "long_window must exceed short_window",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    if config.get_string("strategy", "stop_loss").is_none() {
        return Ok(());
    }
    let value = config.get_double("strategy", "stop_loss", f64::NAN);
    if !(value > 0.0 && value < 1.0) {
        return Err(GoldenCrossError::invalid(
            "strategy",
            "stop_loss",
            "stop_loss must be a fraction between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_volume_multiplier(config: &dyn ConfigPort) -> Result<(), GoldenCrossError> {
    if config.get_string("strategy", "volume_multiplier").is_none() {
        return Ok(());
    }
    let value = config.get_double("strategy", "volume_multiplier", f64::NAN);
    if !(value > 0.0 && value.is_finite()) {
        return Err(GoldenCrossError::invalid(
            "strategy",
            "volume_multiplier",
            "volume_multiplier must be positive",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
initial_capital = 100000.0
risk_free_rate = 0.01
start_date = 2020-01-01
end_date = 2024-12-31
symbol = 2330.TW
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = make_config("[backtest]\n");
        assert!(validate_backtest_config(&config).is_ok());
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn initial_capital_must_be_positive() {
        let config = make_config("[backtest]\ninitial_capital = -100\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "initial_capital")
        );
    }

    #[test]
    fn initial_capital_zero_fails() {
        let config = make_config("[backtest]\ninitial_capital = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "initial_capital")
        );
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let config = make_config("[backtest]\nrisk_free_rate = 1.5\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );
    }

    #[test]
    fn risk_free_rate_negative_fails() {
        let config = make_config("[backtest]\nrisk_free_rate = -0.05\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "risk_free_rate")
        );
    }

    #[test]
    fn invalid_start_date_format_fails() {
        let config = make_config("[backtest]\nstart_date = 2020/01/01\nend_date = 2024-12-31\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_date_after_end_date_fails() {
        let config = make_config("[backtest]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn single_date_bound_is_allowed() {
        let config = make_config("[backtest]\nstart_date = 2024-01-01\n");
        assert!(validate_backtest_config(&config).is_ok());
        assert_eq!(
            parse_optional_date(&config, "start_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(parse_optional_date(&config, "end_date").unwrap(), None);
    }

    #[test]
    fn valid_strategy_config_passes() {
        let config = make_config(
            r#"
[strategy]
kind = volume_confirmed
short_window = 5
long_window = 20
rsi_period = 14
volume_window = 20
stop_loss = 0.1
volume_multiplier = 1.2
"#,
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn unknown_kind_fails() {
        let config = make_config("[strategy]\nkind = momentum\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn zero_window_fails() {
        let config = make_config("[strategy]\nshort_window = 0\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(
            matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "short_window")
        );
    }

    #[test]
    fn short_window_must_be_shorter() {
        let config = make_config("[strategy]\nshort_window = 20\nlong_window = 20\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "long_window"));
    }

    #[test]
    fn stop_loss_out_of_range_fails() {
        for value in ["0", "1", "-0.1", "10"] {
            let config = make_config(&format!("[strategy]\nstop_loss = {value}\n"));
            let err = validate_strategy_config(&config).unwrap_err();
            assert!(
                matches!(
                    err,
                    GoldenCrossError::ConfigInvalid { ref key, .. } if key == "stop_loss"
                ),
                "stop_loss = {value} should fail"
            );
        }
    }

    #[test]
    fn volume_multiplier_must_be_positive() {
        let config = make_config("[strategy]\nvolume_multiplier = 0\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(
            matches!(err, GoldenCrossError::ConfigInvalid { key, .. } if key == "volume_multiplier")
        );
    }
}
