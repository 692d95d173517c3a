//! Configuration validation.
//!
//! Validates every field before a simulator is built.

use crate::domain::config::SimulationConfig;
use crate::domain::error::TradesimError;

/// One hundred years of history.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

pub fn validate_simulation_config(config: &SimulationConfig) -> Result<(), TradesimError> {
    validate_symbol(config)?;
    validate_lookback(config)?;
    validate_window(config)?;
    validate_initial_balance(config)?;
    validate_risk_per_trade(config)?;
    validate_take_profit(config)?;
    validate_stop_loss(config)?;
    validate_source(config)?;
    Ok(())
}

fn validate_symbol(config: &SimulationConfig) -> Result<(), TradesimError> {
    if config.symbol.trim().is_empty() {
        return Err(TradesimError::invalid(
            "simulation",
            "symbol",
            "symbol must not be empty",
        ));
    }
    Ok(())
}

fn validate_lookback(config: &SimulationConfig) -> Result<(), TradesimError> {
    if config.lookback_days < 1 || config.lookback_days > MAX_LOOKBACK_DAYS {
        return Err(TradesimError::invalid(
            "simulation",
            "lookback_days",
            format!("lookback_days must be between 1 and {}", MAX_LOOKBACK_DAYS),
        ));
    }
    Ok(())
}

fn validate_window(config: &SimulationConfig) -> Result<(), TradesimError> {
    if config.window < 1 {
        return Err(TradesimError::invalid(
            "simulation",
            "window",
            "window must be at least 1",
        ));
    }
    Ok(())
}

fn validate_initial_balance(config: &SimulationConfig) -> Result<(), TradesimError> {
    if !(config.initial_balance > 0.0) || !config.initial_balance.is_finite() {
        return Err(TradesimError::invalid(
            "ledger",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_per_trade(config: &SimulationConfig) -> Result<(), TradesimError> {
    let value = config.ledger.risk_per_trade;
    if !(value > 0.0 && value <= 1.0) {
        return Err(TradesimError::invalid(
            "ledger",
            "risk_per_trade",
            "risk_per_trade must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_take_profit(config: &SimulationConfig) -> Result<(), TradesimError> {
    let value = config.ledger.take_profit;
    if !(value > 0.0) || !value.is_finite() {
        return Err(TradesimError::invalid(
            "ledger",
            "take_profit",
            "take_profit must be positive",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &SimulationConfig) -> Result<(), TradesimError> {
    let value = config.ledger.stop_loss;
    if !(value > 0.0 && value < 1.0) {
        return Err(TradesimError::invalid(
            "ledger",
            "stop_loss",
            "stop_loss must be in (0, 1)",
        ));
    }
    Ok(())
}

fn validate_source(config: &SimulationConfig) -> Result<(), TradesimError> {
    if config.source.max_attempts < 1 {
        return Err(TradesimError::invalid(
            "source",
            "max_attempts",
            "max_attempts must be at least 1",
        ));
    }
    if config.source.retry_delay_ms < 0 {
        return Err(TradesimError::invalid(
            "source",
            "retry_delay_ms",
            "retry_delay_ms must be non-negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_key(config: &SimulationConfig) -> String {
        match validate_simulation_config(config) {
            Err(TradesimError::ConfigInvalid { key, .. }) => key,
            other => panic!("expected ConfigInvalid, got {:?}", other),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_simulation_config(&SimulationConfig::default()).is_ok());
    }

    #[test]
    fn empty_symbol() {
        let config = SimulationConfig {
            symbol: "  ".into(),
            ..Default::default()
        };
        assert_eq!(invalid_key(&config), "symbol");
    }

    #[test]
    fn lookback_and_window() {
        let config = SimulationConfig {
            lookback_days: 0,
            ..Default::default()
        };
        assert_eq!(invalid_key(&config), "lookback_days");

        let config = SimulationConfig {
            lookback_days: MAX_LOOKBACK_DAYS,
            ..Default::default()
        };
        assert!(validate_simulation_config(&config).is_ok());

        let config = SimulationConfig {
            lookback_days: 200_000_000,
            ..Default::default()
        };
        assert_eq!(invalid_key(&config), "lookback_days");

        let config = SimulationConfig {
            window: 0,
            ..Default::default()
        };
        assert_eq!(invalid_key(&config), "window");
    }

    #[test]
    fn initial_balance_must_be_positive() {
        for balance in [0.0, -10.0, f64::NAN] {
            let config = SimulationConfig {
                initial_balance: balance,
                ..Default::default()
            };
            assert_eq!(invalid_key(&config), "initial_balance");
        }
    }

    #[test]
    fn risk_per_trade_bounds() {
        let mut config = SimulationConfig::default();
        config.ledger.risk_per_trade = 1.0;
        assert!(validate_simulation_config(&config).is_ok());

        for risk in [0.0, -0.1, 1.01] {
            config.ledger.risk_per_trade = risk;
            assert_eq!(invalid_key(&config), "risk_per_trade");
        }
    }

    #[test]
    fn take_profit_and_stop_loss_bounds() {
        let mut config = SimulationConfig::default();
        config.ledger.take_profit = 0.0;
        assert_eq!(invalid_key(&config), "take_profit");

        let mut config = SimulationConfig::default();
        config.ledger.stop_loss = 1.0;
        assert_eq!(invalid_key(&config), "stop_loss");
        config.ledger.stop_loss = 0.0;
        assert_eq!(invalid_key(&config), "stop_loss");
    }

    #[test]
    fn source_settings() {
        let mut config = SimulationConfig::default();
        config.source.max_attempts = 0;
        assert_eq!(invalid_key(&config), "max_attempts");

        let mut config = SimulationConfig::default();
        config.source.retry_delay_ms = -1;
        assert_eq!(invalid_key(&config), "retry_delay_ms");
    }
}
