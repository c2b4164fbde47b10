//! Performance metrics computed once from a finished simulation.

use super::frame::PriceFrame;
use super::portfolio::{EquityPoint, Portfolio};
use super::strategy::StrategyKind;
use super::trade::{Trade, round_trips};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;

/// Summary of one backtest run. Percent fields are in percent units
/// (12.5 means 12.5%); `sharpe_ratio` is a plain ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub symbol: String,
    pub strategy: StrategyKind,
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub buy_hold_return: f64,
    pub excess_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Completed round trips.
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Input bars plus the moving-average, volume and equity columns.
    pub frame: PriceFrame,
}

impl PerformanceReport {
    pub fn compute(
        frame: PriceFrame,
        portfolio: Portfolio,
        strategy: StrategyKind,
        risk_free_rate: f64,
    ) -> Self {
        let initial_capital = portfolio.initial_capital;
        let final_value = portfolio
            .equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_value - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };
        let buy_hold_return = buy_and_hold_return(&frame);

        let returns = equity_returns(&portfolio.equity_curve);
        let volatility = annualized_volatility(&returns);
        let sharpe_ratio = sharpe_ratio(total_return, volatility, risk_free_rate);
        let max_drawdown = max_drawdown(&portfolio.equity_curve);

        let total_trades = round_trips(&portfolio.trades).count();
        let winning_trades = round_trips(&portfolio.trades)
            .filter(|trip| trip.is_win())
            .count();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        PerformanceReport {
            symbol: frame.symbol.clone(),
            strategy,
            initial_capital,
            final_value,
            total_return,
            buy_hold_return,
            excess_return: total_return - buy_hold_return,
            volatility,
            sharpe_ratio,
            max_drawdown,
            total_trades,
            winning_trades,
            win_rate,
            trades: portfolio.trades,
            equity_curve: portfolio.equity_curve,
            frame,
        }
    }
}

fn buy_and_hold_return(frame: &PriceFrame) -> f64 {
    match (frame.bars().first(), frame.bars().last()) {
        (Some(first), Some(last)) if first.close != 0.0 => {
            (last.close - first.close) / first.close * 100.0
        }
        _ => 0.0,
    }
}

/// Bar-over-bar fractional returns of the equity curve.
///
/// Steps from a zero equity value are skipped.
pub fn equity_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter(|w| w[0].equity != 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity)
        .collect()
}

/// Sample standard deviation of `returns` annualized by sqrt(252), in percent.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
}

/// `(total_return - rf) / volatility` with both returns as fractions; 0 when
/// volatility is 0.
pub fn sharpe_ratio(total_return_pct: f64, volatility_pct: f64, risk_free_rate: f64) -> f64 {
    if volatility_pct == 0.0 {
        return 0.0;
    }
    (total_return_pct / 100.0 - risk_free_rate) / (volatility_pct / 100.0)
}

/// Largest peak-to-trough decline as a non-positive percent.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        peak = peak.max(point.equity);
        if peak > 0.0 {
            worst = worst.min((point.equity - peak) / peak * 100.0);
        }
    }
    worst
}
