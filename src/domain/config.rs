//! Typed simulation configuration.
//!
//! Built from a [`ConfigPort`], then checked by
//! [`config_validation::validate_simulation_config`](crate::domain::config_validation).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::config_validation::validate_simulation_config;
use crate::domain::error::TradesimError;
use crate::domain::history::RetryPolicy;
use crate::domain::ledger::{
    DEFAULT_RISK_PER_TRADE, DEFAULT_STOP_LOSS, DEFAULT_TAKE_PROFIT, LedgerConfig,
};
use crate::domain::ohlcv::Interval;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
pub const DEFAULT_WINDOW: usize = 100;
pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_MAX_ATTEMPTS: i64 = 3;
pub const DEFAULT_RETRY_DELAY_MS: i64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Directory holding `<SYMBOL>_<interval>.csv` files; `None` means
    /// synthetic data only.
    pub csv_dir: Option<PathBuf>,
    pub max_attempts: i64,
    pub retry_delay_ms: i64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            csv_dir: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl SourceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: u32::try_from(self.max_attempts.max(1)).unwrap_or(u32::MAX),
            delay: Duration::from_millis(self.retry_delay_ms.max(0) as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub symbol: String,
    pub interval: Interval,
    pub lookback_days: i64,
    pub window: usize,
    pub seed: Option<u64>,
    pub initial_balance: f64,
    pub ledger: LedgerConfig,
    pub source: SourceConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            symbol: DEFAULT_SYMBOL.to_string(),
            interval: Interval::default(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            window: DEFAULT_WINDOW,
            seed: None,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            ledger: LedgerConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Read every section, falling back to defaults for absent keys, then
    /// validate. A key that is present but unparsable is an error rather
    /// than a silent default.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradesimError> {
        let symbol = config
            .get_string("simulation", "symbol")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

        let interval = match config.get_string("simulation", "interval") {
            Some(raw) => Interval::from_str(raw.trim())
                .map_err(|e| TradesimError::invalid("simulation", "interval", e.to_string()))?,
            None => Interval::default(),
        };

        let window = read_parsed::<i64>(config, "simulation", "window")?
            .unwrap_or(DEFAULT_WINDOW as i64);
        if window < 1 {
            return Err(TradesimError::invalid(
                "simulation",
                "window",
                "window must be at least 1",
            ));
        }

        let sim = SimulationConfig {
            symbol,
            interval,
            lookback_days: read_parsed(config, "simulation", "lookback_days")?
                .unwrap_or(DEFAULT_LOOKBACK_DAYS),
            window: window as usize,
            seed: read_parsed(config, "simulation", "seed")?,
            initial_balance: read_parsed(config, "ledger", "initial_balance")?
                .unwrap_or(DEFAULT_INITIAL_BALANCE),
            ledger: LedgerConfig {
                risk_per_trade: read_parsed(config, "ledger", "risk_per_trade")?
                    .unwrap_or(DEFAULT_RISK_PER_TRADE),
                take_profit: read_parsed(config, "ledger", "take_profit")?
                    .unwrap_or(DEFAULT_TAKE_PROFIT),
                stop_loss: read_parsed(config, "ledger", "stop_loss")?
                    .unwrap_or(DEFAULT_STOP_LOSS),
                validate_entries: config.get_bool("ledger", "validate_entries", false),
            },
            source: SourceConfig {
                csv_dir: config
                    .get_string("source", "csv_dir")
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from),
                max_attempts: read_parsed(config, "source", "max_attempts")?
                    .unwrap_or(DEFAULT_MAX_ATTEMPTS),
                retry_delay_ms: read_parsed(config, "source", "retry_delay_ms")?
                    .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            },
        };

        validate_simulation_config(&sim)?;
        Ok(sim)
    }
}

fn read_parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TradesimError> {
    if !config.has_value(section, key) {
        return Ok(None);
    }
    let raw = config.get_string(section, key).unwrap_or_default();
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| TradesimError::invalid(section, key, format!("cannot parse '{}'", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            MapConfig(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    #[test]
    fn empty_config_gives_defaults() {
        let sim = SimulationConfig::from_config(&MapConfig::new(&[])).unwrap();
        assert_eq!(sim, SimulationConfig::default());
        assert_eq!(sim.symbol, "BTCUSDT");
        assert_eq!(sim.interval, Interval::Hour1);
        assert_eq!(sim.window, 100);
        assert_eq!(sim.seed, None);
        assert!(!sim.ledger.validate_entries);
        assert_eq!(sim.source.csv_dir, None);
    }

    #[test]
    fn reads_all_sections() {
        let config = MapConfig::new(&[
            ("simulation", "symbol", " ETHUSDT "),
            ("simulation", "interval", "15m"),
            ("simulation", "lookback_days", "7"),
            ("simulation", "window", "50"),
            ("simulation", "seed", "42"),
            ("ledger", "initial_balance", "2500"),
            ("ledger", "risk_per_trade", "0.1"),
            ("ledger", "take_profit", "0.05"),
            ("ledger", "stop_loss", "0.01"),
            ("ledger", "validate_entries", "true"),
            ("source", "csv_dir", "/data/bars"),
            ("source", "max_attempts", "5"),
            ("source", "retry_delay_ms", "0"),
        ]);
        let sim = SimulationConfig::from_config(&config).unwrap();

        assert_eq!(sim.symbol, "ETHUSDT");
        assert_eq!(sim.interval, Interval::Minute15);
        assert_eq!(sim.lookback_days, 7);
        assert_eq!(sim.window, 50);
        assert_eq!(sim.seed, Some(42));
        assert_eq!(sim.initial_balance, 2500.0);
        assert_eq!(sim.ledger.risk_per_trade, 0.1);
        assert_eq!(sim.ledger.take_profit, 0.05);
        assert_eq!(sim.ledger.stop_loss, 0.01);
        assert!(sim.ledger.validate_entries);
        assert_eq!(sim.source.csv_dir, Some(PathBuf::from("/data/bars")));
        assert_eq!(sim.source.retry_policy().max_attempts, 5);
        assert!(sim.source.retry_policy().delay.is_zero());
    }

    #[test]
    fn unknown_interval_rejected() {
        let err = SimulationConfig::from_config(&MapConfig::new(&[(
            "simulation",
            "interval",
            "7h",
        )]))
        .unwrap_err();
        assert!(matches!(
            err,
            TradesimError::ConfigInvalid { ref key, .. } if key == "interval"
        ));
    }

    #[test]
    fn unparsable_number_rejected() {
        let err = SimulationConfig::from_config(&MapConfig::new(&[(
            "ledger",
            "initial_balance",
            "lots",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("cannot parse 'lots'"));
    }

    #[test]
    fn zero_window_rejected() {
        let err =
            SimulationConfig::from_config(&MapConfig::new(&[("simulation", "window", "0")]))
                .unwrap_err();
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let err = SimulationConfig::from_config(&MapConfig::new(&[(
            "ledger",
            "risk_per_trade",
            "1.5",
        )]))
        .unwrap_err();
        assert!(matches!(
            err,
            TradesimError::ConfigInvalid { ref key, .. } if key == "risk_per_trade"
        ));
    }

    #[test]
    fn blank_csv_dir_means_synthetic() {
        let sim =
            SimulationConfig::from_config(&MapConfig::new(&[("source", "csv_dir", "  ")]))
                .unwrap();
        assert_eq!(sim.source.csv_dir, None);
    }
}
