//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use tracing::debug;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub sales: SalesConfig,

    /// Sales registered when the worker starts
    #[serde(default)]
    pub catalog: Vec<CatalogSale>,
}

/// Admission and hold settings
#[derive(Debug, Deserialize, Clone)]
pub struct SalesConfig {
    /// How long an admitted reservation holds its tickets
    #[serde(default = "default_hold_duration")]
    pub hold_duration_secs: i64,

    /// Interval between admission passes in the worker
    #[serde(default = "default_process_interval")]
    pub process_interval_secs: u64,

    /// Interval between hold sweeps in the worker
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_hold_duration() -> i64 {
    480 // 8 minutes
}

/// Longest hold a sale may grant (one week)
pub const MAX_HOLD_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

fn default_process_interval() -> u64 {
    1
}

fn default_sweep_interval() -> u64 {
    30
}

/// A sale declared in configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSale {
    pub name: String,
    pub capacity: i32,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            hold_duration_secs: default_hold_duration(),
            process_interval_secs: default_process_interval(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl SalesConfig {
    /// Hold window as a chrono duration
    pub fn hold_duration(&self) -> Result<chrono::Duration, ConfigError> {
        chrono::Duration::try_seconds(self.hold_duration_secs).ok_or_else(|| {
            ConfigError::Message(format!(
                "sales.hold_duration_secs {} is out of range",
                self.hold_duration_secs
            ))
        })
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        debug!("Loading configuration for run mode {}", run_mode);

        let config = Config::builder()
            // Start with default values
            .set_default("sales.hold_duration_secs", default_hold_duration())?
            .set_default("sales.process_interval_secs", default_process_interval() as i64)?
            .set_default("sales.sweep_interval_secs", default_sweep_interval() as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with BOXOFFICE_ prefix
            .add_source(
                Environment::with_prefix("BOXOFFICE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sales.hold_duration_secs <= 0 {
            return Err(ConfigError::Message(
                "sales.hold_duration_secs must be positive".to_string(),
            ));
        }
        if self.sales.hold_duration_secs > MAX_HOLD_DURATION_SECS {
            return Err(ConfigError::Message(format!(
                "sales.hold_duration_secs must not exceed {}",
                MAX_HOLD_DURATION_SECS
            )));
        }
        if self.sales.process_interval_secs == 0 || self.sales.sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "worker intervals must be at least one second".to_string(),
            ));
        }
        if let Some(bad) = self.catalog.iter().find(|s| s.capacity < 0) {
            return Err(ConfigError::Message(format!(
                "catalog sale '{}' has negative capacity",
                bad.name
            )));
        }
        Ok(())
    }
}
