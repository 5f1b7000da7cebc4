//! Configuration validation.
//!
//! Validates all config fields before a replay runs.

use crate::domain::error::TidesimError;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    validate_data_path(config)?;
    validate_symbols(config)?;
    validate_initial_balance(config)?;
    validate_risk_per_trade(config)?;
    validate_ordering(config)?;
    validate_exit_rules(config)?;
    validate_strategy(config)?;
    Ok(())
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TidesimError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    match config.get_string("backtest", "symbols") {
        Some(s) if s.split(',').any(|p| !p.trim().is_empty()) => Ok(()),
        _ => Err(TidesimError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbols".to_string(),
        }),
    }
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    let value = config.get_double("backtest", "initial_balance", 1000.0);
    if value <= 0.0 {
        return Err(TidesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_balance".to_string(),
            reason: "initial_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_per_trade(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    let value = config.get_double("backtest", "risk_per_trade", 0.1);
    if value <= 0.0 || value > 1.0 {
        return Err(TidesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_per_trade".to_string(),
            reason: "risk_per_trade must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_ordering(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    match config.get_string("backtest", "ordering").as_deref() {
        None | Some("exits_first") | Some("entries_first") => Ok(()),
        Some(other) => Err(TidesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "ordering".to_string(),
            reason: format!("unknown ordering '{}', expected exits_first or entries_first", other),
        }),
    }
}

fn validate_exit_rules(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    let take_profit = config.get_double("backtest", "take_profit_pct", 0.20);
    if take_profit <= 0.0 {
        return Err(TidesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "take_profit_pct".to_string(),
            reason: "take_profit_pct must be positive".to_string(),
        });
    }
    let trailing = config.get_double("backtest", "trailing_stop_pct", 0.15);
    if trailing <= 0.0 || trailing >= 1.0 {
        return Err(TidesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "trailing_stop_pct".to_string(),
            reason: "trailing_stop_pct must be between 0 and 1".to_string(),
        });
    }
    let max_hold = config.get_double("backtest", "max_hold_hours", 48.0);
    if max_hold <= 0.0 {
        return Err(TidesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "max_hold_hours".to_string(),
            reason: "max_hold_hours must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), TidesimError> {
    let rsi_period = config.get_int("strategy", "rsi_period", 14);
    if rsi_period < 2 {
        return Err(TidesimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "rsi_period".to_string(),
            reason: "rsi_period must be at least 2".to_string(),
        });
    }

    let oversold = config.get_double("strategy", "oversold", 30.0);
    let overbought = config.get_double("strategy", "overbought", 70.0);
    if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
        return Err(TidesimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "oversold".to_string(),
            reason: "oversold and overbought must be between 0 and 100".to_string(),
        });
    }
    if oversold >= overbought {
        return Err(TidesimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "oversold".to_string(),
            reason: "oversold must be below overbought".to_string(),
        });
    }

    let fast = config.get_int("strategy", "macd_fast", 12);
    let slow = config.get_int("strategy", "macd_slow", 26);
    let signal = config.get_int("strategy", "macd_signal", 9);
    if fast < 1 || slow < 1 || signal < 1 {
        return Err(TidesimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "macd_fast".to_string(),
            reason: "macd periods must be positive".to_string(),
        });
    }
    if fast >= slow {
        return Err(TidesimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "macd_fast".to_string(),
            reason: "macd_fast must be below macd_slow".to_string(),
        });
    }
    Ok(())
}
