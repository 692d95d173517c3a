//! Trade statistics over closed positions.

use super::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub realized_pnl: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    /// Mean holding time in minutes.
    pub avg_hold_minutes: f64,
}

impl TradeStats {
    /// Positions without a realized pnl (still open) are skipped.
    pub fn compute(positions: &[Position]) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_minutes = 0i64;

        for position in positions {
            let Some(pnl) = position.pnl else {
                continue;
            };

            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }

            if let Some(exit_time) = position.exit_time {
                total_minutes += (exit_time - position.entry_time).num_minutes();
            }
        }

        let total_trades = trades_won + trades_lost + trades_breakeven;
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_hold_minutes = if total_trades > 0 {
            total_minutes as f64 / total_trades as f64
        } else {
            0.0
        };

        TradeStats {
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            realized_pnl: total_wins - total_losses,
            profit_factor,
            largest_win,
            largest_loss,
            avg_hold_minutes,
        }
    }
}
