//! Technical indicator implementations.
//!
//! Every indicator is computed over the whole price series and yields one
//! point per bar. Points before an indicator's lookback window carry no value
//! (`None`), never a placeholder zero:
//! - `IndicatorValue`: the shape of one indicator output
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of optional indicator values
//! - `IndicatorFrame`: the fixed indicator set the signal stage reads

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::calculate_bollinger;
pub use ema::ema_values;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::ohlcv::PriceBar;

pub const SMA_FAST: usize = 20;
pub const SMA_SLOW: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULT_X100: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn undefined(indicator_type: IndicatorType, bars: &[PriceBar]) -> Self {
        IndicatorSeries {
            indicator_type,
            values: bars
                .iter()
                .map(|b| IndicatorPoint {
                    timestamp: b.timestamp,
                    value: None,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The scalar value at `index`, if defined.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index)?.value? {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// Indicator values at one bar index. `None` means "no value yet".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorSet {
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// Column-oriented indicator values for a whole series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    pub sma_20: Vec<Option<f64>>,
    pub sma_50: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_histogram: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
}

impl IndicatorFrame {
    /// The indicators `compute` produces, in column order.
    pub fn indicator_types() -> [IndicatorType; 5] {
        [
            IndicatorType::Sma(SMA_FAST),
            IndicatorType::Sma(SMA_SLOW),
            IndicatorType::Rsi(RSI_PERIOD),
            IndicatorType::Macd {
                fast: macd::DEFAULT_FAST,
                slow: macd::DEFAULT_SLOW,
                signal: macd::DEFAULT_SIGNAL,
            },
            IndicatorType::Bollinger {
                period: BOLLINGER_PERIOD,
                stddev_mult_x100: BOLLINGER_MULT_X100,
            },
        ]
    }

    /// Recompute every indicator from scratch over `bars`.
    pub fn compute(bars: &[PriceBar]) -> Self {
        let sma_20 = calculate_sma(bars, SMA_FAST);
        let sma_50 = calculate_sma(bars, SMA_SLOW);
        let rsi = calculate_rsi(bars, RSI_PERIOD);
        let macd = macd::calculate_macd_default(bars);
        let bollinger = calculate_bollinger(bars, BOLLINGER_PERIOD, BOLLINGER_MULT_X100);

        let mut frame = IndicatorFrame {
            sma_20: simple_column(&sma_20),
            sma_50: simple_column(&sma_50),
            rsi: simple_column(&rsi),
            ..Default::default()
        };

        for point in &macd.values {
            let (line, signal, histogram) = match point.value {
                Some(IndicatorValue::Macd {
                    line,
                    signal,
                    histogram,
                }) => (Some(line), Some(signal), Some(histogram)),
                _ => (None, None, None),
            };
            frame.macd.push(line);
            frame.macd_signal.push(signal);
            frame.macd_histogram.push(histogram);
        }

        for point in &bollinger.values {
            let (upper, middle, lower) = match point.value {
                Some(IndicatorValue::Bollinger {
                    upper,
                    middle,
                    lower,
                }) => (Some(upper), Some(middle), Some(lower)),
                _ => (None, None, None),
            };
            frame.bb_upper.push(upper);
            frame.bb_middle.push(middle);
            frame.bb_lower.push(lower);
        }

        frame
    }

    pub fn len(&self) -> usize {
        self.sma_20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma_20.is_empty()
    }

    /// Indicator values at `index`; all `None` past the end of the series.
    pub fn at(&self, index: usize) -> IndicatorSet {
        let get = |column: &Vec<Option<f64>>| column.get(index).copied().flatten();
        IndicatorSet {
            sma_20: get(&self.sma_20),
            sma_50: get(&self.sma_50),
            rsi: get(&self.rsi),
            macd: get(&self.macd),
            macd_signal: get(&self.macd_signal),
            macd_histogram: get(&self.macd_histogram),
            bb_middle: get(&self.bb_middle),
            bb_upper: get(&self.bb_upper),
            bb_lower: get(&self.bb_lower),
        }
    }
}

fn simple_column(series: &IndicatorSeries) -> Vec<Option<f64>> {
    (0..series.len()).map(|i| series.simple_at(i)).collect()
}
