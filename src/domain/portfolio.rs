//! Single-instrument portfolio state, fills and equity tracking.
//!
//! Invariants held after every fill:
//! - `position == 0` iff `entry_price` and `open_entry` are `None`
//! - `cash >= 0`; entries are sized to whole shares the cash can cover
//! - `trades` alternates BUY, SELL starting with BUY

use chrono::NaiveDate;

use super::trade::{ExitReason, Trade, TradeAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Long,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub equity: f64,
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { shares: u64, cost: f64 },
    /// Price exceeds available cash; the portfolio stays flat.
    InsufficientCapital,
    /// Already long or the price is not a positive finite number.
    Rejected,
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub shares: u64,
    pub proceeds: f64,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: u64,
    pub entry_price: Option<f64>,
    /// Index in `trades` of the BUY backing the open position.
    pub open_entry: Option<usize>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: 0,
            entry_price: None,
            open_entry: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn state(&self) -> PositionState {
        if self.position == 0 {
            PositionState::Flat
        } else {
            PositionState::Long
        }
    }

    pub fn open_entry(&self) -> Option<&Trade> {
        self.open_entry.and_then(|i| self.trades.get(i))
    }

    /// Buy as many whole shares as cash allows at `price`.
    pub fn enter_long(&mut self, date: NaiveDate, price: f64) -> EntryResult {
        if self.state() == PositionState::Long || !(price.is_finite() && price > 0.0) {
            return EntryResult::Rejected;
        }

        let mut shares = (self.cash / price).floor() as u64;
        // Float rounding can push shares * price a hair over cash.
        if shares > 0 && shares as f64 * price > self.cash {
            shares -= 1;
        }
        if shares == 0 {
            return EntryResult::InsufficientCapital;
        }

        let cost = shares as f64 * price;
        self.cash -= cost;
        self.position = shares;
        self.entry_price = Some(price);
        self.open_entry = Some(self.trades.len());
        self.trades.push(Trade {
            date,
            action: TradeAction::Buy,
            price,
            shares,
            cash_delta: -cost,
            reason: None,
        });

        EntryResult::Entered { shares, cost }
    }

    /// Sell the whole position at `price`. Returns `None` when flat.
    pub fn exit_long(
        &mut self,
        date: NaiveDate,
        price: f64,
        reason: ExitReason,
    ) -> Option<ExitResult> {
        if self.state() == PositionState::Flat {
            return None;
        }

        let shares = self.position;
        let proceeds = shares as f64 * price;
        let cost = self.open_entry().map_or(0.0, |entry| -entry.cash_delta);

        self.cash += proceeds;
        self.trades.push(Trade {
            date,
            action: TradeAction::Sell,
            price,
            shares,
            cash_delta: proceeds,
            reason: Some(reason),
        });
        self.position = 0;
        self.entry_price = None;
        self.open_entry = None;

        Some(ExitResult {
            shares,
            proceeds,
            pnl: proceeds - cost,
        })
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.position as f64 * price
    }

    pub fn total_equity(&self, price: f64) -> f64 {
        self.cash + self.market_value(price)
    }

    /// Mark the portfolio to `close` and append to the equity curve.
    pub fn record_equity(&mut self, date: NaiveDate, close: f64) -> f64 {
        let equity = self.total_equity(close);
        self.equity_curve.push(EquityPoint {
            date,
            close,
            equity,
        });
        equity
    }
}
