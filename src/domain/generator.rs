//! Synthetic price history generation.
//!
//! Random walk with unit-variance steps around a base level:
//! - close[0] = base, close[i] = close[i-1] + N(0,1)
//! - open = close + U(-50, 50)
//! - high = max(open, close) + U(0, 100), low = min(open, close) - U(0, 100)
//! - volume = U(10, 100)
//!
//! The random source is owned by the caller so runs can be reproduced from a seed.

use chrono::NaiveDateTime;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::domain::ohlcv::{Interval, PriceBar};

pub const SYNTHETIC_BARS: usize = 200;
pub const BASE_PRICE: f64 = 50_000.0;

const OPEN_JITTER: f64 = 50.0;
const WICK_MAX: f64 = 100.0;
const VOLUME_MIN: f64 = 10.0;
const VOLUME_MAX: f64 = 100.0;

/// Generate `count` bars spaced one `interval` apart, the last one stamped `end`.
pub fn generate_series<R: Rng + ?Sized>(
    rng: &mut R,
    interval: Interval,
    end: NaiveDateTime,
    count: usize,
    base_price: f64,
) -> Vec<PriceBar> {
    let step = interval.duration();
    let mut bars = Vec::with_capacity(count);
    let mut close = base_price;

    for i in 0..count {
        if i > 0 {
            let delta: f64 = rng.sample(StandardNormal);
            close += delta;
        }

        let open = close + rng.gen_range(-OPEN_JITTER..OPEN_JITTER);
        let high = open.max(close) + rng.gen_range(0.0..WICK_MAX);
        let low = open.min(close) - rng.gen_range(0.0..WICK_MAX);
        let volume = rng.gen_range(VOLUME_MIN..VOLUME_MAX);

        let bars_before_end = (count - 1 - i) as i32;
        bars.push(PriceBar {
            timestamp: end - step * bars_before_end,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars
}

/// Default-sized series at the default base level.
pub fn generate_default<R: Rng + ?Sized>(
    rng: &mut R,
    interval: Interval,
    end: NaiveDateTime,
) -> Vec<PriceBar> {
    generate_series(rng, interval, end, SYNTHETIC_BARS, BASE_PRICE)
}
