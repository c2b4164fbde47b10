//! Trade records and round-trip pairing.
//!
//! The trade log is flat and strictly alternates BUY, SELL, BUY, ... so the
//! i-th SELL closes the i-th BUY and round trips are paired by position.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("BUY"),
            TradeAction::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    DeathCross,
    StopLoss,
    EndOfPeriod,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::DeathCross => f.write_str("Death Cross"),
            ExitReason::StopLoss => f.write_str("Stop Loss"),
            ExitReason::EndOfPeriod => f.write_str("End of Period"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub price: f64,
    pub shares: u64,
    /// Negative cost for a BUY, positive proceeds for a SELL.
    pub cash_delta: f64,
    pub reason: Option<ExitReason>,
}

/// A BUY and the SELL that closed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip<'a> {
    pub entry: &'a Trade,
    pub exit: &'a Trade,
}

impl RoundTrip<'_> {
    pub fn cost(&self) -> f64 {
        -self.entry.cash_delta
    }

    pub fn proceeds(&self) -> f64 {
        self.exit.cash_delta
    }

    pub fn pnl(&self) -> f64 {
        self.proceeds() - self.cost()
    }

    pub fn is_win(&self) -> bool {
        self.proceeds() > self.cost()
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit.date - self.entry.date).num_days()
    }
}

/// Pair completed round trips by position; a trailing open BUY is ignored.
pub fn round_trips(trades: &[Trade]) -> impl Iterator<Item = RoundTrip<'_>> {
    trades
        .chunks_exact(2)
        .map(|pair| RoundTrip {
            entry: &pair[0],
            exit: &pair[1],
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(day: u32, action: TradeAction, price: f64, shares: u64) -> Trade {
        let notional = price * shares as f64;
        Trade {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            action,
            price,
            shares,
            cash_delta: match action {
                TradeAction::Buy => -notional,
                TradeAction::Sell => notional,
            },
            reason: match action {
                TradeAction::Buy => None,
                TradeAction::Sell => Some(ExitReason::DeathCross),
            },
        }
    }

    #[test]
    fn display_labels() {
        assert_eq!(TradeAction::Buy.to_string(), "BUY");
        assert_eq!(TradeAction::Sell.to_string(), "SELL");
        assert_eq!(ExitReason::DeathCross.to_string(), "Death Cross");
        assert_eq!(ExitReason::StopLoss.to_string(), "Stop Loss");
        assert_eq!(ExitReason::EndOfPeriod.to_string(), "End of Period");
    }

    #[test]
    fn round_trip_profit() {
        let trades = vec![
            trade(1, TradeAction::Buy, 10.0, 100),
            trade(5, TradeAction::Sell, 12.0, 100),
        ];
        let trip = round_trips(&trades).next().unwrap();
        assert_eq!(trip.cost(), 1000.0);
        assert_eq!(trip.proceeds(), 1200.0);
        assert_eq!(trip.pnl(), 200.0);
        assert!(trip.is_win());
        assert_eq!(trip.holding_days(), 4);
    }

    #[test]
    fn breakeven_is_not_a_win() {
        let trades = vec![
            trade(1, TradeAction::Buy, 10.0, 100),
            trade(2, TradeAction::Sell, 10.0, 100),
        ];
        assert!(!round_trips(&trades).next().unwrap().is_win());
    }

    #[test]
    fn pairing_is_positional() {
        let trades = vec![
            trade(1, TradeAction::Buy, 10.0, 100),
            trade(2, TradeAction::Sell, 9.0, 100),
            trade(3, TradeAction::Buy, 9.0, 100),
            trade(4, TradeAction::Sell, 11.0, 100),
            trade(5, TradeAction::Buy, 11.0, 90),
        ];
        let trips: Vec<_> = round_trips(&trades).collect();
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[0].entry.date, trades[0].date);
        assert_eq!(trips[1].exit.date, trades[3].date);
        assert!(!trips[0].is_win());
        assert!(trips[1].is_win());
    }
}
