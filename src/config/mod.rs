//! Configuration management for the PhotoTag companion
//!
//! Handles loading, parsing and validating the YAML configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::warn;

use crate::state::CONNECTED_BATTERY_LEVEL;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Simulated device link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,
    #[serde(default = "default_connect_delay")]
    pub connect_delay_ms: u64,
    #[serde(default = "default_disconnect_delay")]
    pub disconnect_delay_ms: u64,
    #[serde(default = "default_write_delay")]
    pub write_delay_ms: u64,
    #[serde(default = "default_connected_battery")]
    pub connected_battery: u8,
    /// Reject a link operation while another one is still in flight
    #[serde(default)]
    pub single_flight: bool,
}

impl DeviceConfig {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }

    pub fn disconnect_delay(&self) -> Duration {
        Duration::from_millis(self.disconnect_delay_ms)
    }

    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.write_delay_ms)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            connect_delay_ms: default_connect_delay(),
            disconnect_delay_ms: default_disconnect_delay(),
            write_delay_ms: default_write_delay(),
            connected_battery: default_connected_battery(),
            single_flight: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not exist
    ///
    /// A file that exists but fails to parse or validate is still an error.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs::try_exists(path).await.unwrap_or(false) {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    /// Save configuration to file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.device.name.trim().is_empty() {
            anyhow::bail!("device.name cannot be empty");
        }
        if self.device.connected_battery == 0 || self.device.connected_battery > 100 {
            anyhow::bail!(
                "device.connected_battery {} is invalid (must be 1-100)",
                self.device.connected_battery
            );
        }
        if self.logging.level.trim().is_empty() {
            anyhow::bail!("logging.level cannot be empty");
        }
        Ok(())
    }
}

// Default value functions
fn default_device_name() -> String { "PhotoTag".to_string() }
fn default_connect_delay() -> u64 { 2000 }
fn default_disconnect_delay() -> u64 { 1500 }
fn default_write_delay() -> u64 { 2500 }
fn default_connected_battery() -> u8 { CONNECTED_BATTERY_LEVEL }
fn default_log_level() -> String { "info".to_string() }
