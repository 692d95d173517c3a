//! Price history acquisition.
//!
//! Tries the configured external source a bounded number of times and falls
//! back to synthetic generation. The result is tagged with where the bars
//! came from, so the fallback is an explicit branch rather than a swallowed
//! error.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use std::thread;

use crate::domain::error::TradesimError;
use crate::domain::generator::generate_default;
use crate::domain::ohlcv::{Interval, PriceBar};
use crate::ports::price_source::PriceSource;

#[derive(Debug, Clone, PartialEq)]
pub enum PriceHistory {
    Live(Vec<PriceBar>),
    Synthetic(Vec<PriceBar>),
}

impl PriceHistory {
    pub fn bars(&self) -> &[PriceBar] {
        match self {
            PriceHistory::Live(bars) | PriceHistory::Synthetic(bars) => bars,
        }
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        match self {
            PriceHistory::Live(bars) | PriceHistory::Synthetic(bars) => bars,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, PriceHistory::Live(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: std::time::Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            delay: std::time::Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryRequest<'a> {
    pub symbol: &'a str,
    pub interval: Interval,
    pub lookback_days: i64,
    pub now: NaiveDateTime,
}

impl HistoryRequest<'_> {
    /// `now - lookback_days`, or `None` when that falls outside the
    /// representable date range.
    pub fn start(&self) -> Option<NaiveDateTime> {
        Duration::try_days(self.lookback_days).and_then(|span| self.now.checked_sub_signed(span))
    }
}

/// Outcome of one acquisition: the series plus every failed attempt.
#[derive(Debug)]
pub struct Acquisition {
    pub history: PriceHistory,
    pub failures: Vec<TradesimError>,
}

pub fn acquire_history<R: Rng + ?Sized>(
    source: Option<&dyn PriceSource>,
    request: &HistoryRequest<'_>,
    policy: &RetryPolicy,
    rng: &mut R,
) -> Acquisition {
    let mut failures = Vec::new();

    let window = request.start().map(|start| (start, request.now));
    if source.is_some() && window.is_none() {
        failures.push(TradesimError::Source {
            reason: format!("lookback of {} days is out of range", request.lookback_days),
        });
    }

    if let (Some(source), Some((start, end))) = (source, window) {
        for attempt in 0..policy.max_attempts {
            if attempt > 0 && !policy.delay.is_zero() {
                thread::sleep(policy.delay);
            }

            let fetched = source
                .fetch_bars(request.symbol, request.interval, start, end)
                .and_then(|bars| {
                    validate_series(request.symbol, &bars)?;
                    Ok(bars)
                });

            match fetched {
                Ok(bars) => {
                    return Acquisition {
                        history: PriceHistory::Live(bars),
                        failures,
                    };
                }
                Err(e) => failures.push(e),
            }
        }
    }

    let bars = generate_default(rng, request.interval, request.now);
    Acquisition {
        history: PriceHistory::Synthetic(bars),
        failures,
    }
}

/// A usable series is non-empty, finite and strictly increasing in time.
pub fn validate_series(symbol: &str, bars: &[PriceBar]) -> Result<(), TradesimError> {
    let invalid = |reason: String| TradesimError::InvalidSeries {
        symbol: symbol.to_string(),
        reason,
    };

    if bars.is_empty() {
        return Err(invalid("no bars".to_string()));
    }

    if let Some(i) = bars.iter().position(|b| !b.is_finite()) {
        return Err(invalid(format!("non-finite value in bar {}", i)));
    }

    if let Some(i) = bars
        .windows(2)
        .position(|w| w[1].timestamp <= w[0].timestamp)
    {
        return Err(invalid(format!(
            "timestamps not strictly increasing at bar {}",
            i + 1
        )));
    }

    Ok(())
}
