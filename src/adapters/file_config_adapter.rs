//! INI file configuration adapter.

use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradesimError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TradesimError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TradesimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradesimError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::SimulationConfig;
    use crate::domain::ohlcv::Interval;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[simulation]
symbol = ETHUSDT
interval = 4h

[ledger]
initial_balance = 2500.0
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("simulation", "symbol"),
            Some("ETHUSDT".to_string())
        );
        assert_eq!(
            adapter.get_string("simulation", "interval"),
            Some("4h".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[ledger]\ninitial_balance = 100\n").unwrap();
        assert_eq!(adapter.get_string("ledger", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert!(!adapter.has_value("ledger", "missing"));
        assert!(adapter.has_value("ledger", "initial_balance"));
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[simulation]\nwindow = 50\n").unwrap();
        assert_eq!(adapter.get_int("simulation", "window", 0), 50);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[simulation]\n").unwrap();
        assert_eq!(adapter.get_int("simulation", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[simulation]\nwindow = abc\n").unwrap();
        assert_eq!(adapter.get_int("simulation", "window", 42), 42);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[ledger]\ninitial_balance = 10000.5\n").unwrap();
        assert_eq!(adapter.get_double("ledger", "initial_balance", 0.0), 10000.5);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[ledger]\nstop_loss = not_a_number\n").unwrap();
        assert_eq!(adapter.get_double("ledger", "stop_loss", 0.02), 0.02);
    }

    #[test]
    fn get_bool_values() {
        let adapter = FileConfigAdapter::from_string(
            "[ledger]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("ledger", "a", false));
        assert!(adapter.get_bool("ledger", "b", false));
        assert!(adapter.get_bool("ledger", "c", false));
        assert!(!adapter.get_bool("ledger", "d", true));
        assert!(!adapter.get_bool("ledger", "e", true));
        assert!(!adapter.get_bool("ledger", "f", true));
    }

    #[test]
    fn get_bool_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[ledger]\n").unwrap();
        assert!(adapter.get_bool("ledger", "missing", true));
        assert!(!adapter.get_bool("ledger", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let content = "[source]\ncsv_dir = /data/bars\n";
        let file = create_temp_config(content);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("source", "csv_dir"),
            Some("/data/bars".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(TradesimError::ConfigParse { .. })));
    }

    #[test]
    fn builds_simulation_config_from_all_sections() {
        let content = r#"
[simulation]
symbol = BTCUSDT
interval = 1d
lookback_days = 90
window = 60
seed = 1234

[ledger]
initial_balance = 5000
risk_per_trade = 0.05
take_profit = 0.04
stop_loss = 0.015
validate_entries = yes

[source]
csv_dir = ./data
max_attempts = 2
retry_delay_ms = 250
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        let sim = SimulationConfig::from_config(&adapter).unwrap();

        assert_eq!(sim.interval, Interval::Day1);
        assert_eq!(sim.lookback_days, 90);
        assert_eq!(sim.window, 60);
        assert_eq!(sim.seed, Some(1234));
        assert_eq!(sim.initial_balance, 5000.0);
        assert_eq!(sim.ledger.risk_per_trade, 0.05);
        assert!(sim.ledger.validate_entries);
        assert_eq!(sim.source.max_attempts, 2);
        assert_eq!(sim.source.retry_delay_ms, 250);
    }
}
