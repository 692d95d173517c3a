//! Simulated positions.
//!
//! Positions are opened and closed only by the ledger. `Side::Short` is a
//! declared variant that no current signal path opens; the price checks
//! below still mirror correctly for it.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn direction(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PositionStatus {
    Open,
    Closed,
}

impl PositionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionStatus::Open => "open",
            PositionStatus::Closed => "closed",
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Signal,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::Signal => "signal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub entry_time: NaiveDateTime,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub exit_price: Option<f64>,
    pub exit_time: Option<NaiveDateTime>,
    pub pnl: Option<f64>,
    pub exit_reason: Option<ExitReason>,
    pub status: PositionStatus,
}

impl Position {
    pub fn open_long(
        symbol: &str,
        entry_price: f64,
        quantity: f64,
        entry_time: NaiveDateTime,
        take_profit: f64,
        stop_loss: f64,
    ) -> Self {
        Position {
            symbol: symbol.to_string(),
            side: Side::Long,
            entry_price,
            quantity,
            entry_time,
            take_profit,
            stop_loss,
            exit_price: None,
            exit_time: None,
            pnl: None,
            exit_reason: None,
            status: PositionStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.side.direction() * (price - self.entry_price) * self.quantity
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price <= self.stop_loss,
            Side::Short => price >= self.stop_loss,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price >= self.take_profit,
            Side::Short => price <= self.take_profit,
        }
    }

    /// Close in place and return the realized pnl.
    pub(crate) fn close(
        &mut self,
        exit_price: f64,
        exit_time: NaiveDateTime,
        reason: ExitReason,
    ) -> f64 {
        let pnl = self.unrealized_pnl(exit_price);
        self.exit_price = Some(exit_price);
        self.exit_time = Some(exit_time);
        self.pnl = Some(pnl);
        self.exit_reason = Some(reason);
        self.status = PositionStatus::Closed;
        pnl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_long_position() -> Position {
        Position::open_long("BTCUSDT", 100.0, 2.0, at(9), 103.0, 98.0)
    }

    fn sample_short_position() -> Position {
        Position {
            side: Side::Short,
            take_profit: 97.0,
            stop_loss: 102.0,
            ..sample_long_position()
        }
    }

    #[test]
    fn open_long_fields() {
        let pos = sample_long_position();
        assert!(pos.is_open());
        assert!(pos.is_long());
        assert_eq!(pos.symbol, "BTCUSDT");
        assert_eq!(pos.exit_price, None);
        assert_eq!(pos.exit_time, None);
        assert_eq!(pos.pnl, None);
        assert_eq!(pos.exit_reason, None);
    }

    #[test]
    fn unrealized_pnl_long() {
        let pos = sample_long_position();
        assert!((pos.unrealized_pnl(105.0) - 10.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(95.0) - (-10.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_short() {
        let pos = sample_short_position();
        assert!((pos.unrealized_pnl(95.0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_loss_long_triggered() {
        let pos = sample_long_position();
        assert!(pos.should_stop_loss(97.0));
        assert!(pos.should_stop_loss(98.0));
        assert!(!pos.should_stop_loss(98.5));
    }

    #[test]
    fn take_profit_long_triggered() {
        let pos = sample_long_position();
        assert!(pos.should_take_profit(104.0));
        assert!(pos.should_take_profit(103.0));
        assert!(!pos.should_take_profit(102.9));
    }

    #[test]
    fn short_levels_mirror() {
        let pos = sample_short_position();
        assert!(pos.should_stop_loss(102.0));
        assert!(!pos.should_stop_loss(101.0));
        assert!(pos.should_take_profit(97.0));
        assert!(!pos.should_take_profit(98.0));
    }

    #[test]
    fn close_populates_exit_fields() {
        let mut pos = sample_long_position();
        let pnl = pos.close(98.0, at(10), ExitReason::StopLoss);

        assert!((pnl - (-4.0)).abs() < f64::EPSILON);
        assert_eq!(pos.status, PositionStatus::Closed);
        assert_eq!(pos.exit_price, Some(98.0));
        assert_eq!(pos.exit_time, Some(at(10)));
        assert_eq!(pos.pnl, Some(pnl));
        assert_eq!(pos.exit_reason, Some(ExitReason::StopLoss));
    }

    #[test]
    fn labels() {
        assert_eq!(Side::Long.to_string(), "long");
        assert_eq!(Side::Short.as_str(), "short");
        assert_eq!(PositionStatus::Closed.as_str(), "closed");
        assert_eq!(ExitReason::TakeProfit.as_str(), "take_profit");
    }
}
