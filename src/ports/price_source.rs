//! External price history port.

use chrono::NaiveDateTime;

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::{Interval, PriceBar};

/// A source of real bars for one symbol, e.g. an exchange feed or a file dump.
pub trait PriceSource {
    /// Bars with `start <= timestamp <= end`, in chronological order.
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, TradesimError>;
}
