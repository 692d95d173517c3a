#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tradesim::domain::error::TradesimError;
pub use tradesim::domain::ohlcv::{Interval, PriceBar};
use tradesim::ports::price_source::PriceSource;

/// Serves a fixed series after failing a configurable number of times.
/// The call counter is shared so tests can observe it after the source
/// has been moved into a simulator.
pub struct MockPriceSource {
    pub bars: Vec<PriceBar>,
    pub failures: usize,
    pub calls: Arc<AtomicUsize>,
}

impl MockPriceSource {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self {
            bars,
            failures: 0,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::new(Vec::new())
        }
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_bars(
        &self,
        symbol: &str,
        _interval: Interval,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, TradesimError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(TradesimError::Source {
                reason: format!("{} unavailable", symbol),
            });
        }
        Ok(self.bars.clone())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_bar(hour: usize, close: f64) -> PriceBar {
    PriceBar {
        timestamp: start_time() + Duration::hours(hour as i64),
        open: close,
        high: close,
        low: close,
        close,
        volume: 25.0,
    }
}

/// Hourly bars with the given closes.
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i, close))
        .collect()
}

/// `count` strictly increasing closes starting at `first`.
pub fn uptrend(count: usize, first: f64, step: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| first + step * i as f64).collect();
    make_bars(&closes)
}

/// Oscillating series that swings through the Bollinger bands.
pub fn wave(count: usize) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| {
            let t = i as f64;
            1000.0 + 60.0 * (t / 9.0).sin() + 25.0 * (t / 2.3).sin()
        })
        .collect();
    make_bars(&closes)
}

pub const SAMPLE_INI: &str = r#"
[simulation]
symbol = BTCUSDT
interval = 1h
lookback_days = 10
window = 50
seed = 42

[ledger]
initial_balance = 10000
risk_per_trade = 0.02
take_profit = 0.03
stop_loss = 0.02
validate_entries = false

[source]
max_attempts = 1
retry_delay_ms = 0
"#;

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
