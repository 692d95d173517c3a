//! Core domain types and logic.

pub mod config;
pub mod config_validation;
pub mod error;
pub mod generator;
pub mod history;
pub mod indicator;
pub mod ledger;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod signal;
pub mod simulator;
pub mod snapshot;
