//! Configuration validation.
//!
//! Validates every recognised key before a scan starts, so a bad value
//! fails fast instead of surfacing halfway through a watchlist.

use crate::domain::error::SwingError;
use crate::domain::period::{Interval, Period};
use crate::ports::config_port::ConfigPort;

pub const DATA_SOURCES: [&str; 2] = ["yahoo", "csv"];

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), SwingError> {
    validate_period_and_interval(config)?;
    validate_data_source(config)?;
    validate_integer(config, "scan", "cache_ttl_secs", 0)?;
    validate_integer(config, "data", "max_retries", 0)?;
    validate_integer(config, "data", "timeout_secs", 1)?;
    validate_signal_params(config)?;
    validate_risk(config)?;
    Ok(())
}

fn validate_period_and_interval(config: &dyn ConfigPort) -> Result<(), SwingError> {
    if let Some(s) = config.get_string("scan", "period") {
        s.parse::<Period>()?;
    }
    if let Some(s) = config.get_string("scan", "interval") {
        s.parse::<Interval>()?;
    }
    Ok(())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), SwingError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "yahoo".to_string());
    let source = source.trim().to_lowercase();

    if !DATA_SOURCES.contains(&source.as_str()) {
        return Err(SwingError::invalid(
            "data",
            "source",
            format!("unknown data source '{source}' (expected yahoo or csv)"),
        ));
    }

    if source == "csv" {
        match config.get_string("data", "csv_dir") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(SwingError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                })
            }
        }
    }
    Ok(())
}

fn validate_signal_params(config: &dyn ConfigPort) -> Result<(), SwingError> {
    let multiplier = parse_double(config, "signals", "volume_spike_multiplier")?;
    if multiplier.is_some_and(|v| v <= 0.0) {
        return Err(SwingError::invalid(
            "signals",
            "volume_spike_multiplier",
            "volume_spike_multiplier must be positive",
        ));
    }

    let proximity = parse_double(config, "signals", "ema_proximity_pct")?;
    if proximity.is_some_and(|v| v <= 0.0 || v >= 1.0) {
        return Err(SwingError::invalid(
            "signals",
            "ema_proximity_pct",
            "ema_proximity_pct must be between 0 and 1",
        ));
    }

    validate_integer(config, "signals", "swing_high_lookback", 1)?;
    validate_integer(config, "signals", "structure_lookback", 1)?;
    Ok(())
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), SwingError> {
    if parse_double(config, "risk", "capital")?.is_some_and(|v| v <= 0.0) {
        return Err(SwingError::invalid(
            "risk",
            "capital",
            "capital must be positive",
        ));
    }
    if parse_double(config, "risk", "risk_pct")?.is_some_and(|v| v <= 0.0 || v > 100.0) {
        return Err(SwingError::invalid(
            "risk",
            "risk_pct",
            "risk_pct must be in (0, 100]",
        ));
    }
    Ok(())
}

/// `None` when the key is absent; present values must parse as finite numbers.
fn parse_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, SwingError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(SwingError::invalid(
            section,
            key,
            format!("'{}' is not a number", raw.trim()),
        )),
    }
}

fn validate_integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    minimum: i64,
) -> Result<(), SwingError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= minimum => Ok(()),
        Ok(_) => Err(SwingError::invalid(
            section,
            key,
            format!("{key} must be at least {minimum}"),
        )),
        Err(_) => Err(SwingError::invalid(
            section,
            key,
            format!("'{}' is not an integer", raw.trim()),
        )),
    }
}
