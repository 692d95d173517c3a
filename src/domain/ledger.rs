//! Position/risk ledger.
//!
//! Owns the account balance and the open/closed position collections.
//! Two operations run once per tick, in order:
//! 1. `mark_and_settle`: close positions whose stop-loss or take-profit level
//!    the current price has reached (stop-loss checked first)
//! 2. `apply_signal`: buy opens a fixed-fraction long if no position is open;
//!    sell closes every open long at the current price
//!
//! The balance moves only when a position closes, by that position's pnl.

use chrono::NaiveDateTime;

use super::position::{ExitReason, Position, Side};
use super::signal::Signal;

pub const DEFAULT_RISK_PER_TRADE: f64 = 0.02;
pub const DEFAULT_TAKE_PROFIT: f64 = 0.03;
pub const DEFAULT_STOP_LOSS: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Fraction of the balance committed per trade.
    pub risk_per_trade: f64,
    /// Take-profit distance above entry, as a fraction of the entry price.
    pub take_profit: f64,
    /// Stop-loss distance below entry, as a fraction of the entry price.
    pub stop_loss: f64,
    /// Refuse entries with a non-positive balance, price or quantity.
    pub validate_entries: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            risk_per_trade: DEFAULT_RISK_PER_TRADE,
            take_profit: DEFAULT_TAKE_PROFIT,
            stop_loss: DEFAULT_STOP_LOSS,
            validate_entries: false,
        }
    }
}

/// What `apply_signal` did.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    Opened { quantity: f64, entry_price: f64 },
    Closed { count: usize, pnl: f64 },
    AlreadyOpen,
    Rejected { reason: String },
    NoAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub symbol: String,
    pub initial_balance: f64,
    pub balance: f64,
    pub open_positions: Vec<Position>,
    pub closed_positions: Vec<Position>,
    pub config: LedgerConfig,
}

impl Ledger {
    pub fn new(symbol: &str, initial_balance: f64, config: LedgerConfig) -> Self {
        Ledger {
            symbol: symbol.to_string(),
            initial_balance,
            balance: initial_balance,
            open_positions: Vec::new(),
            closed_positions: Vec::new(),
            config,
        }
    }

    pub fn has_open_position(&self) -> bool {
        !self.open_positions.is_empty()
    }

    /// Close any position whose protective level `price` has reached.
    /// Exits fill at the level itself, not at `price`. Returns the number closed.
    pub fn mark_and_settle(&mut self, price: f64, time: NaiveDateTime) -> usize {
        let triggered: Vec<(usize, f64, ExitReason)> = self
            .open_positions
            .iter()
            .enumerate()
            .filter_map(|(i, pos)| {
                if pos.should_stop_loss(price) {
                    Some((i, pos.stop_loss, ExitReason::StopLoss))
                } else if pos.should_take_profit(price) {
                    Some((i, pos.take_profit, ExitReason::TakeProfit))
                } else {
                    None
                }
            })
            .collect();

        let count = triggered.len();
        // Highest index first so earlier indices stay valid.
        for (index, exit_price, reason) in triggered.into_iter().rev() {
            self.close_at(index, exit_price, time, reason);
        }
        count
    }

    pub fn apply_signal(&mut self, signal: Signal, price: f64, time: NaiveDateTime) -> SignalOutcome {
        match signal {
            Signal::Buy => self.enter_long(price, time),
            Signal::Sell => self.exit_longs(price, time),
            Signal::Hold => SignalOutcome::NoAction,
        }
    }

    fn enter_long(&mut self, price: f64, time: NaiveDateTime) -> SignalOutcome {
        if self.has_open_position() {
            return SignalOutcome::AlreadyOpen;
        }

        let risk_amount = self.balance * self.config.risk_per_trade;
        let quantity = risk_amount / price;

        if self.config.validate_entries {
            if let Some(reason) = self.entry_rejection(price, quantity) {
                return SignalOutcome::Rejected { reason };
            }
        }

        let take_profit = price * (1.0 + self.config.take_profit);
        let stop_loss = price * (1.0 - self.config.stop_loss);
        self.open_positions.push(Position::open_long(
            &self.symbol,
            price,
            quantity,
            time,
            take_profit,
            stop_loss,
        ));

        SignalOutcome::Opened {
            quantity,
            entry_price: price,
        }
    }

    fn entry_rejection(&self, price: f64, quantity: f64) -> Option<String> {
        if !(self.balance > 0.0) {
            return Some(format!("balance {} is not positive", self.balance));
        }
        if !(price > 0.0) || !price.is_finite() {
            return Some(format!("price {} is not positive", price));
        }
        if !(quantity > 0.0) || !quantity.is_finite() {
            return Some(format!("quantity {} is not positive", quantity));
        }
        None
    }

    fn exit_longs(&mut self, price: f64, time: NaiveDateTime) -> SignalOutcome {
        let longs: Vec<usize> = self
            .open_positions
            .iter()
            .enumerate()
            .filter(|(_, pos)| pos.side == Side::Long)
            .map(|(i, _)| i)
            .collect();

        if longs.is_empty() {
            return SignalOutcome::NoAction;
        }

        let count = longs.len();
        let mut pnl = 0.0;
        for index in longs.into_iter().rev() {
            pnl += self.close_at(index, price, time, ExitReason::Signal);
        }
        SignalOutcome::Closed { count, pnl }
    }

    fn close_at(
        &mut self,
        index: usize,
        exit_price: f64,
        time: NaiveDateTime,
        reason: ExitReason,
    ) -> f64 {
        let mut position = self.open_positions.remove(index);
        let pnl = position.close(exit_price, time, reason);
        self.balance += pnl;
        self.closed_positions.push(position);
        pnl
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.open_positions
            .iter()
            .map(|p| p.unrealized_pnl(price))
            .sum()
    }

    /// Balance plus the mark-to-market value of open positions.
    pub fn equity(&self, price: f64) -> f64 {
        self.balance + self.unrealized_pnl(price)
    }
}
