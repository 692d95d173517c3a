//! CSV file price source.
//!
//! One file per symbol and interval, `<dir>/<SYMBOL>_<interval>.csv`, with
//! header `timestamp,open,high,low,close,volume`.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::{Interval, PriceBar, TIMESTAMP_FORMAT, format_timestamp};
use crate::ports::price_source::PriceSource;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

pub struct CsvPriceSource {
    base_path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn csv_path(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.base_path.join(csv_file_name(symbol, interval))
    }
}

pub fn csv_file_name(symbol: &str, interval: Interval) -> String {
    format!("{}_{}.csv", symbol, interval)
}

fn source_error(reason: String) -> TradesimError {
    TradesimError::Source { reason }
}

fn column<T: FromStr>(record: &csv::StringRecord, index: usize) -> Result<T, TradesimError>
where
    T::Err: std::fmt::Display,
{
    let name = HEADER[index];
    record
        .get(index)
        .ok_or_else(|| source_error(format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| source_error(format!("invalid {} value: {}", name, e)))
}

impl PriceSource for CsvPriceSource {
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<PriceBar>, TradesimError> {
        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path)
            .map_err(|e| source_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| source_error(format!("CSV parse error: {}", e)))?;

            let ts_str = record
                .get(0)
                .ok_or_else(|| source_error("missing timestamp column".into()))?;
            let timestamp = NaiveDateTime::parse_from_str(ts_str.trim(), TIMESTAMP_FORMAT)
                .map_err(|e| source_error(format!("invalid timestamp format: {}", e)))?;

            if timestamp < start || timestamp > end {
                continue;
            }

            bars.push(PriceBar {
                timestamp,
                open: column(&record, 1)?,
                high: column(&record, 2)?,
                low: column(&record, 3)?,
                close: column(&record, 4)?,
                volume: column(&record, 5)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

/// Write `bars` in the format `CsvPriceSource` reads.
pub fn write_bars(path: &Path, bars: &[PriceBar]) -> Result<(), TradesimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_io_error)?;
    wtr.write_record(HEADER).map_err(csv_io_error)?;

    for bar in bars {
        wtr.write_record([
            format_timestamp(bar.timestamp),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])
        .map_err(csv_io_error)?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn csv_io_error(e: csv::Error) -> TradesimError {
    TradesimError::Io(std::io::Error::other(e))
}
