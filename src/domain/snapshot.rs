//! Read-only view of the simulator at one tick.
//!
//! Series fields are aligned: element `i` of every vector belongs to the
//! same bar. Indicator cells with no value are `None`.

use std::ops::Range;

use crate::domain::indicator::IndicatorFrame;
use crate::domain::ledger::Ledger;
use crate::domain::ohlcv::{PriceBar, format_timestamp};
use crate::domain::position::{ExitReason, Position, PositionStatus, Side};
use crate::domain::signal::{Signal, generate_signal};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionView {
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub entry_time: String,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub exit_price: Option<f64>,
    pub exit_time: Option<String>,
    pub pnl: Option<f64>,
    pub exit_reason: Option<ExitReason>,
    pub status: PositionStatus,
}

impl From<&Position> for PositionView {
    fn from(position: &Position) -> Self {
        PositionView {
            symbol: position.symbol.clone(),
            side: position.side,
            entry_price: position.entry_price,
            quantity: position.quantity,
            entry_time: format_timestamp(position.entry_time),
            take_profit: position.take_profit,
            stop_loss: position.stop_loss,
            exit_price: position.exit_price,
            exit_time: position.exit_time.map(format_timestamp),
            pnl: position.pnl,
            exit_reason: position.exit_reason,
            status: position.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub symbol: String,
    /// Index of the current bar in the full series.
    pub cursor: usize,
    pub timestamps: Vec<String>,
    pub close: Vec<f64>,
    pub sma_20: Vec<Option<f64>>,
    pub sma_50: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub positions: Vec<PositionView>,
    pub closed_positions: Vec<PositionView>,
    pub balance: f64,
    /// Decision taken at the current bar.
    pub action: Signal,
}

/// Bars `[max(0, cursor + 1 - window), cursor]`, clamped to the series.
pub fn window_range(cursor: usize, window: usize, len: usize) -> Range<usize> {
    let end = (cursor + 1).min(len);
    let start = end.saturating_sub(window);
    start..end
}

impl Snapshot {
    pub fn capture(
        bars: &[PriceBar],
        indicators: &IndicatorFrame,
        cursor: usize,
        window: usize,
        ledger: &Ledger,
    ) -> Self {
        let range = window_range(cursor, window, bars.len());
        let column = |values: &[Option<f64>]| {
            values
                .get(range.clone())
                .map(<[Option<f64>]>::to_vec)
                .unwrap_or_default()
        };
        let visible = &bars[range.clone()];

        let action = bars
            .get(cursor)
            .map(|bar| generate_signal(&indicators.at(cursor), bar.close))
            .unwrap_or_default();

        Snapshot {
            symbol: ledger.symbol.clone(),
            cursor,
            timestamps: visible.iter().map(|b| format_timestamp(b.timestamp)).collect(),
            close: visible.iter().map(|b| b.close).collect(),
            sma_20: column(&indicators.sma_20),
            sma_50: column(&indicators.sma_50),
            rsi: column(&indicators.rsi),
            macd: column(&indicators.macd),
            signal: column(&indicators.macd_signal),
            macd_histogram: column(&indicators.macd_histogram),
            bb_upper: column(&indicators.bb_upper),
            bb_middle: column(&indicators.bb_middle),
            bb_lower: column(&indicators.bb_lower),
            positions: ledger.open_positions.iter().map(PositionView::from).collect(),
            closed_positions: ledger
                .closed_positions
                .iter()
                .map(PositionView::from)
                .collect(),
            balance: ledger.balance,
            action,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Close of the current bar.
    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}
