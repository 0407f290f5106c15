use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WaveLiftError;
use crate::formulas::OneRepMaxFormula;
use crate::logging::LogConfig;
use crate::progression::{ProgressionPolicy, ProgressionRules};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Policy used when none is given on the command line
    pub default_policy: ProgressionPolicy,

    /// Increment magnitudes for training max progression
    pub progression: ProgressionRules,

    /// Working weight settings
    pub loading: LoadingSettings,

    /// Performance history import settings
    pub history: HistorySettings,

    /// Logging output
    pub logging: LogConfig,
}

/// Working weight settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingSettings {
    /// Loads are rounded to the nearest multiple of this; zero disables rounding
    pub rounding_increment: Decimal,
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            rounding_increment: dec!(2.5),
        }
    }
}

/// History import settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HistorySettings {
    /// Formula for rows that give weight and reps instead of an estimate
    pub formula: OneRepMaxFormula,
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wavelift")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(
                    path = %config_path.display(),
                    error = %err,
                    "Using default configuration"
                );
                Self::default()
            }
        }
    }

    /// Reject settings that would break the never-decrease guarantee
    pub fn validate(&self) -> std::result::Result<(), WaveLiftError> {
        let rules = &self.progression;
        let non_negative = [
            ("progression.upper_increment", rules.upper_increment),
            ("progression.lower_increment", rules.lower_increment),
            ("progression.target_ratio", rules.target_ratio),
            ("progression.floor_fraction", rules.floor_fraction),
            ("loading.rounding_increment", self.loading.rounding_increment),
        ];
        if let Some((key, value)) = non_negative.iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(WaveLiftError::Configuration(format!(
                "{} must not be negative (got {})",
                key, value
            )));
        }
        if rules.ceiling_multiplier < rules.floor_fraction {
            return Err(WaveLiftError::Configuration(format!(
                "progression.ceiling_multiplier ({}) is below floor_fraction ({})",
                rules.ceiling_multiplier, rules.floor_fraction
            )));
        }
        Ok(())
    }
}
