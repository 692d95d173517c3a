//! RSI (Relative Strength Index).
//!
//! Average gain and average loss are simple rolling means of the positive and
//! negative parts of the one-step close delta over the trailing n deltas:
//! - RS = avg_gain / avg_loss
//! - RSI = 100 - (100 / (1 + RS))
//! - avg_loss == 0: RSI = 100
//!
//! Warmup: the first n bars are undefined (n deltas are needed).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries::undefined(IndicatorType::Rsi(period), bars);
    }

    let mut gains = vec![0.0; bars.len()];
    let mut losses = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        gains[i] = change.max(0.0);
        losses[i] = (-change).max(0.0);
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        gain_sum += gains[i];
        loss_sum += losses[i];
        if i > period {
            gain_sum -= gains[i - period];
            loss_sum -= losses[i - period];
        }

        let value = if i >= period {
            let avg_gain = gain_sum / period as f64;
            let avg_loss = loss_sum / period as f64;
            Some(IndicatorValue::Simple(rsi_from_averages(avg_gain, avg_loss)))
        } else {
            None
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

/// RSI from average gain/loss, pinned to [0, 100]. Zero average loss is 100.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    // Rolling sums can leave tiny negative residue after subtraction.
    if avg_loss <= 1e-12 {
        return 100.0;
    }
    let rs = avg_gain.max(0.0) / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}
