//! Configuration management for Foxflow
//!
//! This module handles loading, validation, and management of the
//! derivation settings (CT2 handling, battery overrides, display units and
//! logging) from YAML files.

use crate::error::{FoxflowError, Result};
use crate::format::DisplayUnit;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

mod defaults;
mod store;

pub use store::ConfigStore;

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "FOXFLOW_CONFIG";

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct Config {
    /// Power-flow derivation toggles
    pub power_flow: PowerFlowConfig,

    /// Battery capacity overrides and display preferences
    pub battery: BatteryConfig,

    /// Display units, precision and timezone
    pub display: DisplayConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Toggles that shape how raw telemetry is turned into power-flow values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct PowerFlowConfig {
    /// Negate the CT2 meter reading (clamp installed backwards)
    pub should_invert_ct2: bool,

    /// Add the CT2 reading to PV power (CT2 measures a second, AC-coupled inverter)
    pub should_combine_ct2_with_pv_power: bool,

    /// Add the magnitude of the CT2 reading to home consumption
    pub should_combine_ct2_with_loads_power: bool,

    /// Keep the sign of home consumption instead of reporting its magnitude
    pub allow_negative_load: bool,

    /// Per-string PV breakdown
    pub strings: PowerFlowStringsConfig,
}

/// Per-string PV power breakdown settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct PowerFlowStringsConfig {
    /// Whether string powers are reported at all
    pub enabled: bool,

    /// Strings in display order
    pub strings: Vec<StringSetting>,
}

/// A single PV string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct StringSetting {
    /// OpenAPI variable name, e.g. `pv1Power`
    pub variable: String,

    /// Display name chosen by the user
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Battery overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct BatteryConfig {
    /// Nameplate capacity in Wh; overrides the device descriptor when set
    pub capacity_wh: Option<u32>,

    /// Minimum state of charge as a fraction (0..1); overrides the device descriptor
    pub min_soc: Option<f64>,

    /// Count the reserve below the minimum SOC as part of the stored charge
    pub include_unusable_capacity: bool,
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct DisplayConfig {
    /// Unit used when rendering power and energy
    pub unit: DisplayUnit,

    /// Number of decimals for kW / kWh values
    pub decimal_places: u8,

    /// IANA timezone used for the last-update time
    pub timezone: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (its directory receives the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load and validate configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `FOXFLOW_CONFIG` or the default locations,
    /// falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return Self::from_file(path);
        }

        let default_paths = [
            "foxflow.yaml",
            "/data/foxflow/config.yaml",
            "/etc/foxflow/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(min_soc) = self.battery.min_soc
            && !(0.0..1.0).contains(&min_soc)
        {
            return Err(FoxflowError::validation(
                "battery.min_soc",
                "Must be a fraction in [0, 1)",
            ));
        }

        if self.battery.capacity_wh == Some(0) {
            return Err(FoxflowError::validation(
                "battery.capacity_wh",
                "Must be greater than 0",
            ));
        }

        if self.display.decimal_places > 6 {
            return Err(FoxflowError::validation(
                "display.decimal_places",
                "Must be at most 6",
            ));
        }

        if self.display.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(FoxflowError::validation(
                "display.timezone",
                format!("Unknown timezone: {}", self.display.timezone),
            ));
        }

        crate::logging::parse_log_level(&self.logging.level)
            .map_err(|_| FoxflowError::validation("logging.level", "Unknown log level"))?;

        let mut seen = HashSet::new();
        for string in &self.power_flow.strings.strings {
            if string.variable.trim().is_empty() {
                return Err(FoxflowError::validation(
                    "power_flow.strings",
                    "String variable cannot be empty",
                ));
            }
            if !seen.insert(string.variable.to_ascii_lowercase()) {
                return Err(FoxflowError::validation(
                    "power_flow.strings",
                    format!("Duplicate string variable: {}", string.variable),
                ));
            }
        }

        Ok(())
    }
}
