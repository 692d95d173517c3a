//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_snapshot_adapter;
pub mod file_config_adapter;
