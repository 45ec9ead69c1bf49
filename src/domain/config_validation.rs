//! Configuration validation.
//!
//! Validates all config fields before a backtest or sweep runs. Unlike the
//! lenient `ConfigPort` getters, a key that is present but unparseable is an
//! error here rather than silently falling back to its default.

use crate::domain::error::TrendtraderError;
use crate::domain::metrics::Timeframe;
use crate::domain::strategy::{DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD, StrategyKind};
use crate::domain::sweep::Objective;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    validate_initial_equity(config)?;
    validate_fee_rate(config)?;
    validate_timeframe(config)?;
    validate_annualization_factor(config)?;
    validate_allow_shorting(config)?;
    validate_protective_exit(config, "stop_loss")?;
    validate_protective_exit(config, "take_profit")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    let name = config
        .get_string("strategy", "name")
        .unwrap_or_else(|| "sma_cross".to_string());
    let fast = read_period(config, "strategy", "fast")?.unwrap_or(DEFAULT_FAST_PERIOD);
    let slow = read_period(config, "strategy", "slow")?.unwrap_or(DEFAULT_SLOW_PERIOD);
    StrategyKind::from_name(&name, fast, slow)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TrendtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

pub fn validate_sweep_config(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    for key in ["fast_periods", "slow_periods"] {
        if let Some(raw) = config.get_string("sweep", key) {
            parse_period_list(&raw, key)?;
        }
    }
    if let Some(raw) = config.get_string("sweep", "objective") {
        raw.parse::<Objective>()?;
    }
    Ok(())
}

/// Parse a comma-separated list of positive periods, e.g. `5, 10, 20`.
pub fn parse_period_list(raw: &str, key: &str) -> Result<Vec<usize>, TrendtraderError> {
    let periods = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(p) if p > 0 => Ok(p),
            _ => Err(TrendtraderError::config_invalid(
                "sweep",
                key,
                format!("'{s}' is not a positive integer"),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if periods.is_empty() {
        return Err(TrendtraderError::config_invalid(
            "sweep",
            key,
            "period list must not be empty",
        ));
    }
    Ok(periods)
}

/// Read an optional float; present-but-invalid is an error.
pub(crate) fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, TrendtraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
            TrendtraderError::config_invalid(section, key, format!("'{raw}' is not a number"))
        }),
    }
}

/// Read an optional period; present-but-invalid is an error.
pub(crate) fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, TrendtraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
            TrendtraderError::config_invalid(
                section,
                key,
                format!("'{raw}' is not a non-negative integer"),
            )
        }),
    }
}

fn validate_initial_equity(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    if let Some(value) = read_double(config, "backtest", "initial_equity")? {
        if !(value.is_finite() && value > 0.0) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "initial_equity",
                "initial_equity must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_fee_rate(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    if let Some(value) = read_double(config, "backtest", "fee_rate")? {
        if !(value.is_finite() && (0.0..1.0).contains(&value)) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "fee_rate",
                "fee_rate must be in [0, 1)",
            ));
        }
    }
    Ok(())
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    if let Some(raw) = config.get_string("backtest", "timeframe") {
        raw.parse::<Timeframe>()?;
    }
    Ok(())
}

fn validate_annualization_factor(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    if let Some(value) = read_double(config, "backtest", "annualization_factor")? {
        if !(value.is_finite() && value > 0.0) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "annualization_factor",
                "annualization_factor must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_allow_shorting(config: &dyn ConfigPort) -> Result<(), TrendtraderError> {
    if let Some(raw) = config.get_string("backtest", "allow_shorting") {
        let known = matches!(
            raw.trim().to_lowercase().as_str(),
            "true" | "yes" | "1" | "false" | "no" | "0"
        );
        if !known {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                "allow_shorting",
                format!("'{raw}' is not a boolean"),
            ));
        }
    }
    Ok(())
}

fn validate_protective_exit(config: &dyn ConfigPort, key: &str) -> Result<(), TrendtraderError> {
    if let Some(value) = read_double(config, "backtest", key)? {
        if !(value.is_finite() && value >= 0.0) {
            return Err(TrendtraderError::config_invalid(
                "backtest",
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }
    Ok(())
}
