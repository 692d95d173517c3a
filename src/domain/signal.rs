//! Trading signal generation.
//!
//! Each indicator family votes buy/sell/hold; the votes are combined
//! conservatively. MACD must agree with either RSI or the Bollinger
//! band check before a buy or sell is emitted. Missing indicator values
//! vote hold.

use std::fmt;

use crate::domain::indicator::IndicatorSet;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three per-indicator votes behind a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSignals {
    pub macd: Signal,
    pub rsi: Signal,
    pub bollinger: Signal,
}

impl SubSignals {
    pub fn from_indicators(indicators: &IndicatorSet, close: f64) -> Self {
        SubSignals {
            macd: macd_signal(
                indicators.macd,
                indicators.macd_signal,
                indicators.macd_histogram,
            ),
            rsi: rsi_signal(indicators.rsi),
            bollinger: bollinger_signal(close, indicators.bb_upper, indicators.bb_lower),
        }
    }

    /// buy iff MACD and RSI both say buy, or MACD and Bollinger both say buy;
    /// sell symmetrically; hold otherwise.
    pub fn combine(self) -> Signal {
        for side in [Signal::Buy, Signal::Sell] {
            if self.macd == side && (self.rsi == side || self.bollinger == side) {
                return side;
            }
        }
        Signal::Hold
    }
}

pub fn macd_signal(line: Option<f64>, signal: Option<f64>, histogram: Option<f64>) -> Signal {
    match (line, signal, histogram) {
        (Some(line), Some(signal), Some(histogram)) => {
            if line > signal && histogram > 0.0 {
                Signal::Buy
            } else if line < signal && histogram < 0.0 {
                Signal::Sell
            } else {
                Signal::Hold
            }
        }
        _ => Signal::Hold,
    }
}

pub fn rsi_signal(rsi: Option<f64>) -> Signal {
    match rsi {
        Some(rsi) if rsi < RSI_OVERSOLD => Signal::Buy,
        Some(rsi) if rsi > RSI_OVERBOUGHT => Signal::Sell,
        _ => Signal::Hold,
    }
}

pub fn bollinger_signal(close: f64, upper: Option<f64>, lower: Option<f64>) -> Signal {
    match (upper, lower) {
        (_, Some(lower)) if close < lower => Signal::Buy,
        (Some(upper), _) if close > upper => Signal::Sell,
        _ => Signal::Hold,
    }
}

/// Reduce the indicator values at the latest visible bar to one decision.
pub fn generate_signal(indicators: &IndicatorSet, close: f64) -> Signal {
    SubSignals::from_indicators(indicators, close).combine()
}
