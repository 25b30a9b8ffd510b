// src/config/model.rs

use crate::binder::BindOptions;
use crate::sysfs::{BusLayout, CHARDEV_CTRL_PREFIX, CHARDEV_DRIVER, DEFAULT_BUS_ROOT, DEFAULT_DEV_ROOT};
use log::LevelFilter;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;

/// Top-level config; every table and field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub logging: LoggingConfig,
    pub bus: BusConfig,
    pub bind: BindConfig,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Also write to `file`.
    pub enable: bool,
    pub file: Option<String>,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: "INFO".into() }
    }
}

impl LoggingConfig {
    /// Unknown names fall back to INFO.
    pub fn level_filter(&self) -> LevelFilter {
        level_from_str(&self.level)
    }
}

pub fn level_from_str(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "ERROR" => LevelFilter::Error,
        "WARN" => LevelFilter::Warn,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Mirror of the `[bus]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    pub bus_root: PathBuf,
    pub dev_root: PathBuf,
    pub driver: String,
    pub ctrl_prefix: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bus_root: DEFAULT_BUS_ROOT.into(),
            dev_root: DEFAULT_DEV_ROOT.into(),
            driver: CHARDEV_DRIVER.into(),
            ctrl_prefix: CHARDEV_CTRL_PREFIX.into(),
        }
    }
}

impl BusConfig {
    pub fn to_layout(&self) -> BusLayout {
        BusLayout {
            bus_root: self.bus_root.clone(),
            dev_root: self.dev_root.clone(),
            driver: self.driver.clone(),
            ctrl_prefix: self.ctrl_prefix.clone(),
        }
    }
}

/// Mirror of the `[bind]` table; durations are humantime strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindConfig {
    pub probe_timeout: String,
    pub poll_interval: String,
    pub unbind_on_failure: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            probe_timeout: "1s".into(),
            poll_interval: "20ms".into(),
            unbind_on_failure: false,
        }
    }
}

impl BindConfig {
    pub fn to_options(&self) -> Result<BindOptions, ConfigError> {
        Ok(BindOptions {
            probe_timeout: parse_duration(&self.probe_timeout)?,
            poll_interval: parse_duration(&self.poll_interval)?,
            unbind_on_failure: self.unbind_on_failure,
        })
    }
}

/// `"0"` is accepted as a zero duration.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    if s.trim() == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(s).map_err(|e| ConfigError::InvalidDuration(s.into(), e))
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration '{0}': {1}")]
    InvalidDuration(String, #[source] humantime::DurationError),

    #[error("can't read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
