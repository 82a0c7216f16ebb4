//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::error::SupresError;
use crate::domain::ohlcv::DEFAULT_DATE_FORMAT;
use crate::domain::signal::TouchPolicy;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SupresError> {
    validate_initial_capital(config)?;
    validate_commission(config)?;
    read_double(config, "backtest", "null_value", 0.0)?;
    validate_dates(config)?;
    Ok(())
}

/// Integer at `[section] key`, `default` when absent.
pub fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, SupresError> {
    config
        .get_int(section, key, default)
        .map_err(|_| not_a_number(config, section, key))
}

/// Finite number at `[section] key`, `default` when absent.
pub fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SupresError> {
    match config.get_double(section, key, default) {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(not_a_number(config, section, key)),
    }
}

fn not_a_number(config: &dyn ConfigPort, section: &str, key: &str) -> SupresError {
    SupresError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!(
            "'{}' is not a number",
            config.get_string(section, key).unwrap_or_default().trim()
        ),
    }
}

/// The data file may come from the command line instead of the config.
pub fn validate_data_file(config: &dyn ConfigPort) -> Result<(), SupresError> {
    match config.get_string("backtest", "data_file") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SupresError::ConfigMissing {
            section: "backtest".to_string(),
            key: "data_file".to_string(),
        }),
    }
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SupresError> {
    validate_period(config)?;
    validate_fraction(config, "buy_fraction", 0.1)?;
    validate_fraction(config, "sell_fraction", 0.05)?;
    validate_touch_policy(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SupresError> {
    let value = read_double(config, "backtest", "initial_capital", 100_000.0)?;
    if value <= 0.0 {
        return Err(SupresError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), SupresError> {
    let pct = read_double(config, "backtest", "commission_pct", 0.0)?;
    if pct < 0.0 {
        return Err(SupresError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_pct".to_string(),
            reason: "commission_pct must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SupresError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(SupresError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SupresError> {
    match value {
        None => Err(SupresError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DEFAULT_DATE_FORMAT).map_err(|_| {
            SupresError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), SupresError> {
    let value = read_int(config, "strategy", "period", 30)?;
    if value < 1 {
        return Err(SupresError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "period".to_string(),
            reason: "period must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_fraction(config: &dyn ConfigPort, key: &str, default: f64) -> Result<(), SupresError> {
    let value = read_double(config, "strategy", key, default)?;
    if value <= 0.0 || value > 1.0 {
        return Err(SupresError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("{} must be between 0 and 1", key),
        });
    }
    Ok(())
}

fn validate_touch_policy(config: &dyn ConfigPort) -> Result<(), SupresError> {
    if let Some(value) = config.get_string("strategy", "touch_policy") {
        value
            .parse::<TouchPolicy>()
            .map_err(|reason| SupresError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "touch_policy".to_string(),
                reason,
            })?;
    }
    Ok(())
}
