//! Snapshot export port.

use crate::domain::error::TradesimError;
use crate::domain::snapshot::Snapshot;

/// Port for persisting a snapshot somewhere outside the simulator.
pub trait SnapshotPort {
    fn write(&self, snapshot: &Snapshot, output_path: &str) -> Result<(), TradesimError>;
}
