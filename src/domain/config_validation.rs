//! Configuration validation.
//!
//! Checks the summary, listing and store settings before any store is opened.

use crate::domain::error::BrandspendError;
use crate::ports::config_port::ConfigPort;

pub const BACKENDS: &[&str] = &["sqlite", "postgres", "csv", "memory"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), BrandspendError> {
    validate_backend(config)?;
    validate_top_n(config)?;
    validate_limits(config)?;
    Ok(())
}

fn validate_backend(config: &dyn ConfigPort) -> Result<(), BrandspendError> {
    let backend = config
        .get_string("database", "backend")
        .unwrap_or_else(|| "sqlite".to_string());
    if !BACKENDS.contains(&backend.trim().to_lowercase().as_str()) {
        return Err(BrandspendError::ConfigInvalid {
            section: "database".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend {backend:?}, expected one of {BACKENDS:?}"),
        });
    }
    Ok(())
}

/// Read an integer setting, rejecting values that are present but not integers.
fn int_setting(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, BrandspendError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| BrandspendError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected an integer, got {raw:?}"),
        }),
    }
}

fn validate_top_n(config: &dyn ConfigPort) -> Result<(), BrandspendError> {
    let value = int_setting(config, "summary", "top_n", 10)?;
    if value < 1 {
        return Err(BrandspendError::ConfigInvalid {
            section: "summary".to_string(),
            key: "top_n".to_string(),
            reason: "top_n must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_limits(config: &dyn ConfigPort) -> Result<(), BrandspendError> {
    let default_limit = int_setting(config, "listing", "default_limit", 20)?;
    let max_limit = int_setting(config, "listing", "max_limit", 1000)?;
    if default_limit < 1 {
        return Err(BrandspendError::ConfigInvalid {
            section: "listing".to_string(),
            key: "default_limit".to_string(),
            reason: "default_limit must be at least 1".to_string(),
        });
    }
    if max_limit < default_limit {
        return Err(BrandspendError::ConfigInvalid {
            section: "listing".to_string(),
            key: "max_limit".to_string(),
            reason: "max_limit must not be below default_limit".to_string(),
        });
    }
    Ok(())
}
