//! CSV snapshot writer: one row per visible bar, empty cells for
//! indicator points without a value.

use crate::adapters::csv_adapter::csv_io_error;
use crate::domain::error::TradesimError;
use crate::domain::snapshot::Snapshot;
use crate::ports::snapshot_port::SnapshotPort;

const HEADER: [&str; 11] = [
    "timestamp",
    "close",
    "sma_20",
    "sma_50",
    "rsi",
    "macd",
    "signal",
    "macd_histogram",
    "bb_upper",
    "bb_middle",
    "bb_lower",
];

pub struct CsvSnapshotAdapter;

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl SnapshotPort for CsvSnapshotAdapter {
    fn write(&self, snapshot: &Snapshot, output_path: &str) -> Result<(), TradesimError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_io_error)?;
        wtr.write_record(HEADER).map_err(csv_io_error)?;

        for i in 0..snapshot.len() {
            let indicator = |column: &[Option<f64>]| cell(column.get(i).copied().flatten());
            wtr.write_record([
                snapshot.timestamps[i].clone(),
                snapshot.close[i].to_string(),
                indicator(&snapshot.sma_20),
                indicator(&snapshot.sma_50),
                indicator(&snapshot.rsi),
                indicator(&snapshot.macd),
                indicator(&snapshot.signal),
                indicator(&snapshot.macd_histogram),
                indicator(&snapshot.bb_upper),
                indicator(&snapshot.bb_middle),
                indicator(&snapshot.bb_lower),
            ])
            .map_err(csv_io_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
