//! Simulation driver.
//!
//! Owns the price series, its precomputed indicators, a cursor into the
//! series and the ledger. Each `advance` moves the cursor one bar (wrapping
//! to the start at the end of the series), settles protective exits at
//! that bar's close, then acts on the signal for that bar.
//!
//! The ledger is stamped in simulation time: each pass over the series is
//! shifted forward by the length of the previous passes, so entry and exit
//! times keep increasing across wraps and refreshes.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::config::SimulationConfig;
use crate::domain::config_validation::validate_simulation_config;
use crate::domain::error::TradesimError;
use crate::domain::history::{HistoryRequest, acquire_history, validate_series};
use crate::domain::indicator::IndicatorFrame;
use crate::domain::ledger::{Ledger, SignalOutcome};
use crate::domain::metrics::TradeStats;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{Signal, SubSignals};
use crate::domain::snapshot::Snapshot;
use crate::ports::price_source::PriceSource;

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub snapshot: Snapshot,
    pub sub_signals: SubSignals,
    pub signal: Signal,
    /// Positions closed by stop-loss or take-profit this tick.
    pub settled: usize,
    pub outcome: SignalOutcome,
    /// Simulation time the ledger was stamped with.
    pub time: Option<NaiveDateTime>,
    /// Balance plus open positions marked at this tick's close.
    pub equity: f64,
}

pub struct Simulator {
    config: SimulationConfig,
    source: Option<Box<dyn PriceSource + Send>>,
    rng: StdRng,
    clock: fn() -> NaiveDateTime,
    bars: Vec<PriceBar>,
    live: bool,
    indicators: IndicatorFrame,
    cursor: usize,
    time_offset: TimeDelta,
    last_stamp: Option<NaiveDateTime>,
    ledger: Ledger,
    latest: Option<Snapshot>,
    failures: Vec<TradesimError>,
}

fn wall_clock() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl Simulator {
    /// Validates `config`; no series is loaded until the first `advance`
    /// or an explicit `refresh`.
    pub fn new(
        config: SimulationConfig,
        source: Option<Box<dyn PriceSource + Send>>,
    ) -> Result<Self, TradesimError> {
        validate_simulation_config(&config)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ledger = Ledger::new(&config.symbol, config.initial_balance, config.ledger.clone());

        Ok(Simulator {
            config,
            source,
            rng,
            clock: wall_clock,
            bars: Vec::new(),
            live: false,
            indicators: IndicatorFrame::default(),
            cursor: 0,
            time_offset: TimeDelta::zero(),
            last_stamp: None,
            ledger,
            latest: None,
            failures: Vec::new(),
        })
    }

    /// Replace the time source used for the acquisition window and for
    /// stamping synthetic bars.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Start from a caller-supplied series instead of acquiring one.
    pub fn with_bars(mut self, bars: Vec<PriceBar>) -> Result<Self, TradesimError> {
        validate_series(&self.config.symbol, &bars)?;
        self.install(bars, true);
        Ok(self)
    }

    /// Re-acquire the series, recompute indicators and rewind the cursor.
    /// The ledger is kept. Returns the failed acquisition attempts.
    pub fn refresh(&mut self) -> Vec<TradesimError> {
        let request = HistoryRequest {
            symbol: &self.config.symbol,
            interval: self.config.interval,
            lookback_days: self.config.lookback_days,
            now: (self.clock)(),
        };
        let acquisition = acquire_history(
            self.source.as_deref().map(|s| s as &dyn PriceSource),
            &request,
            &self.config.source.retry_policy(),
            &mut self.rng,
        );
        let live = acquisition.history.is_live();
        self.install(acquisition.history.into_bars(), live);
        acquisition.failures
    }

    fn install(&mut self, bars: Vec<PriceBar>, live: bool) {
        self.time_offset = match (self.last_stamp, bars.first()) {
            (Some(last), Some(first)) => (last - first.timestamp).max(TimeDelta::zero()),
            _ => TimeDelta::zero(),
        };
        self.indicators = IndicatorFrame::compute(&bars);
        self.bars = bars;
        self.live = live;
        self.cursor = 0;
    }

    pub fn advance(&mut self) -> Snapshot {
        self.tick().snapshot
    }

    /// One simulation step.
    pub fn tick(&mut self) -> TickReport {
        if self.bars.is_empty() {
            let failures = self.refresh();
            self.failures.extend(failures);
        }

        self.cursor = if self.cursor + 1 >= self.bars.len() {
            self.extend_time_offset();
            0
        } else {
            self.cursor + 1
        };

        let Some((close, timestamp)) = self
            .bars
            .get(self.cursor)
            .map(|bar| (bar.close, bar.timestamp))
        else {
            return self.idle_report();
        };
        let timestamp = timestamp
            .checked_add_signed(self.time_offset)
            .unwrap_or(NaiveDateTime::MAX);
        self.last_stamp = Some(timestamp);

        let settled = self.ledger.mark_and_settle(close, timestamp);

        let sub_signals = SubSignals::from_indicators(&self.indicators.at(self.cursor), close);
        let signal = sub_signals.combine();
        let outcome = self.ledger.apply_signal(signal, close, timestamp);

        let snapshot = self.snapshot();
        self.latest = Some(snapshot.clone());

        TickReport {
            snapshot,
            sub_signals,
            signal,
            settled,
            outcome,
            time: Some(timestamp),
            equity: self.ledger.equity(close),
        }
    }

    /// Shift the next pass by one full series length plus one interval.
    fn extend_time_offset(&mut self) {
        let (Some(first), Some(last)) = (self.bars.first(), self.bars.last()) else {
            return;
        };
        let span = (last.timestamp - first.timestamp) + self.config.interval.duration();
        if let Some(offset) = self.time_offset.checked_add(&span) {
            self.time_offset = offset;
        }
    }

    fn idle_report(&mut self) -> TickReport {
        let snapshot = self.snapshot();
        self.latest = Some(snapshot.clone());
        TickReport {
            snapshot,
            sub_signals: SubSignals {
                macd: Signal::Hold,
                rsi: Signal::Hold,
                bollinger: Signal::Hold,
            },
            signal: Signal::Hold,
            settled: 0,
            outcome: SignalOutcome::NoAction,
            time: None,
            equity: self.ledger.balance,
        }
    }

    /// Snapshot at the current cursor without advancing.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.bars,
            &self.indicators,
            self.cursor,
            self.config.window,
            &self.ledger,
        )
    }

    /// Snapshot produced by the most recent tick.
    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    /// Acquisition failures collected by implicit loads, drained.
    pub fn take_failures(&mut self) -> Vec<TradesimError> {
        std::mem::take(&mut self.failures)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn indicators(&self) -> &IndicatorFrame {
        &self.indicators
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn trade_stats(&self) -> TradeStats {
        TradeStats::compute(&self.ledger.closed_positions)
    }
}

/// A simulator shared between a ticking thread and readers.
pub type SharedSimulator = Arc<Mutex<Simulator>>;

pub fn shared(simulator: Simulator) -> SharedSimulator {
    Arc::new(Mutex::new(simulator))
}

/// Advance `shared` every `period` on a background thread, `ticks` times or
/// forever when `None`. The lock is held only for the tick itself. The
/// handle yields the number of ticks performed; a poisoned lock stops the
/// loop early.
pub fn spawn_ticker<F>(
    shared: SharedSimulator,
    period: Duration,
    ticks: Option<usize>,
    mut on_tick: F,
) -> JoinHandle<usize>
where
    F: FnMut(&TickReport) + Send + 'static,
{
    thread::spawn(move || {
        let mut done = 0usize;
        while ticks.is_none_or(|limit| done < limit) {
            if done > 0 && !period.is_zero() {
                thread::sleep(period);
            }
            let report = {
                let Ok(mut simulator) = shared.lock() else {
                    break;
                };
                simulator.tick()
            };
            on_tick(&report);
            done += 1;
        }
        done
    })
}
