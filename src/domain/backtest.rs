//! Backtest engine and event loop.
//!
//! One run walks the bars in order over a fresh [`Portfolio`]: entry is
//! checked while flat, exit while long, a final-bar liquidation closes any
//! open position, then equity is marked at the bar's close.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::error::GoldenCrossError;
use super::frame::PriceFrame;
use super::indicator::{calculate_sma, calculate_volume_sma};
use super::metrics::{DEFAULT_RISK_FREE_RATE, PerformanceReport};
use super::portfolio::{EntryResult, Portfolio, PositionState};
use super::signal::detect_crossovers;
use super::strategy::StrategyConfig;
use super::trade::ExitReason;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const PORTFOLIO_VALUE_COLUMN: &str = "Portfolio_Value";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub risk_free_rate: f64,
    pub strategy: StrategyConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            strategy: StrategyConfig::default(),
        }
    }
}

/// Finished simulation state before metrics are derived.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub frame: PriceFrame,
    pub portfolio: Portfolio,
}

/// Run the strategy over `frame` and return the augmented frame and final portfolio.
pub fn simulate(
    frame: &PriceFrame,
    config: &BacktestConfig,
) -> Result<Simulation, GoldenCrossError> {
    if frame.is_empty() {
        return Err(GoldenCrossError::EmptyInput);
    }

    let strategy = &config.strategy;
    let bars = frame.bars();
    if bars.len() < strategy.longest_window() {
        warn!(
            symbol = %frame.symbol,
            bars = bars.len(),
            window = strategy.longest_window(),
            "fewer bars than the longest window; no signals will fire"
        );
    }

    let short_ma = calculate_sma(bars, strategy.short_window);
    let long_ma = calculate_sma(bars, strategy.long_window);
    let volume_ma = calculate_volume_sma(bars, strategy.volume_window);
    let signals = detect_crossovers(&short_ma.simple_values(), &long_ma.simple_values());

    let mut portfolio = Portfolio::new(config.initial_capital);
    let last = bars.len() - 1;

    for (i, bar) in bars.iter().enumerate() {
        let transition = signals.transition(i);

        match portfolio.state() {
            PositionState::Flat => {
                if strategy.should_enter(transition, bar.volume, volume_ma.simple(i)) {
                    match portfolio.enter_long(bar.date, bar.close) {
                        EntryResult::Entered { shares, cost } => {
                            debug!(date = %bar.date, price = bar.close, shares, cost, "BUY");
                        }
                        EntryResult::InsufficientCapital => {
                            debug!(
                                date = %bar.date,
                                price = bar.close,
                                "entry skipped: price exceeds cash"
                            );
                        }
                        EntryResult::Rejected => {
                            debug!(date = %bar.date, price = bar.close, "entry rejected");
                        }
                    }
                }
            }
            PositionState::Long => {
                let exit = strategy.exit_reason(transition, bar.close, portfolio.entry_price);
                if let Some(reason) = exit {
                    close_position(&mut portfolio, bar.date, bar.close, reason);
                }
            }
        }

        if i == last && portfolio.state() == PositionState::Long {
            close_position(&mut portfolio, bar.date, bar.close, ExitReason::EndOfPeriod);
        }

        portfolio.record_equity(bar.date, bar.close);
    }

    let mut augmented = frame.clone();
    augmented.insert_series(&short_ma)?;
    augmented.insert_series(&long_ma)?;
    augmented.insert_series(&volume_ma)?;
    augmented.insert_column(
        PORTFOLIO_VALUE_COLUMN,
        portfolio.equity_curve.iter().map(|p| Some(p.equity)).collect(),
    )?;

    Ok(Simulation {
        frame: augmented,
        portfolio,
    })
}

fn close_position(portfolio: &mut Portfolio, date: NaiveDate, price: f64, reason: ExitReason) {
    if let Some(exit) = portfolio.exit_long(date, price, reason) {
        debug!(%date, price, shares = exit.shares, pnl = exit.pnl, %reason, "SELL");
    }
}

pub fn run_backtest(
    frame: &PriceFrame,
    config: &BacktestConfig,
) -> Result<PerformanceReport, GoldenCrossError> {
    let Simulation { frame, portfolio } = simulate(frame, config)?;
    Ok(PerformanceReport::compute(
        frame,
        portfolio,
        config.strategy.kind,
        config.risk_free_rate,
    ))
}

/// One independent run for [`run_many`].
#[derive(Debug, Clone)]
pub struct BacktestJob {
    pub frame: PriceFrame,
    pub config: BacktestConfig,
}

/// Run independent jobs in parallel. Results keep the input order.
pub fn run_many(jobs: &[BacktestJob]) -> Vec<Result<PerformanceReport, GoldenCrossError>> {
    jobs.par_iter()
        .map(|job| run_backtest(&job.frame, &job.config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use crate::domain::trade::TradeAction;
    use chrono::{Duration, NaiveDate};

    fn make_frame(closes: &[f64], volumes: &[i64]) -> PriceFrame {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: volumes.get(i).copied().unwrap_or(1000),
            })
            .collect();
        PriceFrame::new("TEST", bars)
    }

    fn small_windows(strategy: StrategyConfig) -> BacktestConfig {
        BacktestConfig {
            initial_capital: 1000.0,
            strategy: StrategyConfig {
                short_window: 1,
                long_window: 3,
                volume_window: 3,
                ..strategy
            },
            ..BacktestConfig::default()
        }
    }

    #[test]
    fn default_config() {
        let c = BacktestConfig::default();
        assert!((c.initial_capital - 100_000.0).abs() < f64::EPSILON);
        assert!((c.risk_free_rate - 0.01).abs() < f64::EPSILON);
        assert_eq!(c.strategy, StrategyConfig::crossover());
    }

    #[test]
    fn empty_frame_is_an_error() {
        let frame = PriceFrame::new("EMPTY", Vec::new());
        let err = simulate(&frame, &BacktestConfig::default()).unwrap_err();
        assert!(matches!(err, GoldenCrossError::EmptyInput));
    }

    #[test]
    fn short_series_is_flat() {
        let frame = make_frame(&[10.0, 11.0, 12.0], &[]);
        let sim = simulate(&frame, &BacktestConfig::default()).unwrap();
        assert!(sim.portfolio.trades.is_empty());
        assert!(
            sim.portfolio
                .equity_curve
                .iter()
                .all(|p| (p.equity - 100_000.0).abs() < f64::EPSILON)
        );
    }

    #[test]
    fn death_cross_exit() {
        let frame = make_frame(&[10.0, 10.0, 10.0, 12.0, 14.0, 10.0, 6.0], &[]);
        let sim = simulate(&frame, &small_windows(StrategyConfig::crossover())).unwrap();
        let trades = &sim.portfolio.trades;

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].action, TradeAction::Buy);
        assert_eq!(trades[0].price, 12.0);
        assert_eq!(trades[0].shares, 83);
        assert_eq!(trades[1].action, TradeAction::Sell);
        assert_eq!(trades[1].price, 10.0);
        assert_eq!(trades[1].reason, Some(ExitReason::DeathCross));
        assert_eq!(sim.portfolio.state(), PositionState::Flat);
    }

    #[test]
    fn forced_liquidation_on_last_bar() {
        let frame = make_frame(&[10.0, 10.0, 10.0, 12.0, 14.0], &[]);
        let sim = simulate(&frame, &small_windows(StrategyConfig::crossover())).unwrap();
        let trades = &sim.portfolio.trades;

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[1].reason, Some(ExitReason::EndOfPeriod));
        assert_eq!(trades[1].price, 14.0);
        let last = sim.portfolio.equity_curve.last().unwrap();
        assert!((last.equity - sim.portfolio.cash).abs() < 1e-9);
    }

    #[test]
    fn stop_loss_exit_for_volume_confirmed() {
        // Cross at index 3 on heavy volume, then a drop below 90% of entry
        // while the close stays above the long average.
        let frame = make_frame(
            &[10.0, 10.0, 10.0, 20.0, 17.5, 30.0],
            &[1000, 1000, 1000, 5000, 1000, 1000],
        );
        let sim = simulate(&frame, &small_windows(StrategyConfig::volume_confirmed())).unwrap();
        let trades = &sim.portfolio.trades;

        assert_eq!(trades[0].action, TradeAction::Buy);
        assert_eq!(trades[0].price, 20.0);
        assert_eq!(trades[1].reason, Some(ExitReason::StopLoss));
        assert_eq!(trades[1].price, 17.5);
        assert_eq!(trades.len(), 2);
    }

    #[test]
    fn equity_recorded_after_trades() {
        let frame = make_frame(&[10.0, 10.0, 10.0, 12.0, 14.0], &[]);
        let sim = simulate(&frame, &small_windows(StrategyConfig::crossover())).unwrap();
        let curve = &sim.portfolio.equity_curve;

        assert_eq!(curve.len(), 5);
        // 83 shares at 12 leave 4 in cash.
        assert!((curve[3].equity - 1000.0).abs() < 1e-9);
        assert!((curve[4].equity - (4.0 + 83.0 * 14.0)).abs() < 1e-9);
    }

    #[test]
    fn augmented_frame_columns() {
        let frame = make_frame(&[10.0, 10.0, 10.0, 12.0, 14.0], &[]);
        let sim = simulate(&frame, &small_windows(StrategyConfig::crossover())).unwrap();

        let names: Vec<&str> = sim.frame.column_names().collect();
        assert_eq!(names, vec!["MA1", "MA3", "Volume_MA", "Portfolio_Value"]);
        assert_eq!(sim.frame.bars(), frame.bars());
        assert_eq!(sim.frame.column("MA3").unwrap()[1], None);
    }

    #[test]
    fn run_many_keeps_order() {
        let jobs = vec![
            BacktestJob {
                frame: make_frame(&[10.0, 10.0, 10.0, 12.0, 14.0], &[]),
                config: small_windows(StrategyConfig::crossover()),
            },
            BacktestJob {
                frame: PriceFrame::new("EMPTY", Vec::new()),
                config: BacktestConfig::default(),
            },
            BacktestJob {
                frame: make_frame(&[5.0; 10], &[]),
                config: small_windows(StrategyConfig::volume_confirmed()),
            },
        ];

        let results = run_many(&jobs);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().total_trades, 1);
        assert!(matches!(results[1], Err(GoldenCrossError::EmptyInput)));
        assert_eq!(results[2].as_ref().unwrap().total_trades, 0);
    }
}
