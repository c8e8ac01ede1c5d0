//! Configuration loader for the `gfs-forecast-sensor` add-on.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller), so the rest of the crate never calls `env::var`.
//!
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::hub::DEFAULT_API_URL;
use crate::units::UnitSystem;

/// Read an optional string environment variable with a default value.
macro_rules! optional_env {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

pub const DEFAULT_ENTITY_ID: &str = "sensor.gfs_forecast";
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Strongly typed add-on configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Hub REST API base URL.
    pub api_url: String,

    /// Bearer token for the hub API.
    pub api_token: String,

    /// Entity the forecast is published as.
    pub entity_id: String,

    /// Unit system for published values.
    pub unit_system: UnitSystem,

    /// Directory holding the persisted sensor document.
    pub data_dir: PathBuf,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `SUPERVISOR_TOKEN` – hub API token
///
/// Optional:
/// - `HUB_API_URL` – hub API base URL (default: `http://supervisor/core/api`)
/// - `SENSOR_ENTITY_ID` – published entity (default: `sensor.gfs_forecast`)
/// - `UNIT_SYSTEM` – `Metric` or anything else for imperial (default: `Metric`)
/// - `SENSOR_DATA_DIR` – persisted state directory (default: `/data`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let api_token = require_env!("SUPERVISOR_TOKEN");
    let api_url = optional_env!("HUB_API_URL", DEFAULT_API_URL);
    let entity_id = optional_env!("SENSOR_ENTITY_ID", DEFAULT_ENTITY_ID);
    let unit_system = UnitSystem::from_setting(&optional_env!("UNIT_SYSTEM", "Metric"));
    let data_dir = PathBuf::from(optional_env!("SENSOR_DATA_DIR", DEFAULT_DATA_DIR));

    if api_token.trim().is_empty() {
        return Err(anyhow!("SUPERVISOR_TOKEN must not be empty"));
    }
    if entity_id.trim().is_empty() || entity_id.contains(['/', '\\']) {
        return Err(anyhow!("Invalid SENSOR_ENTITY_ID: {:?}", entity_id));
    }

    Ok(Config {
        api_url,
        api_token,
        entity_id,
        unit_system,
        data_dir,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the API token while showing all other values that were loaded.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  HUB_API_URL      : {}", self.api_url);
        tracing::info!("  SUPERVISOR_TOKEN : {}", mask_token(&self.api_token));
        tracing::info!("  SENSOR_ENTITY_ID : {}", self.entity_id);
        tracing::info!("  UNIT_SYSTEM      : {:?}", self.unit_system);
        tracing::info!("  SENSOR_DATA_DIR  : {}", self.data_dir.display());
    }
}

fn mask_token(token: &str) -> String {
    // ---
    let prefix: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_mask_token() {
        // ---
        assert_eq!(mask_token("short"), "****");
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJh****");
    }
}
