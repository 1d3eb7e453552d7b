use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use trellis_core::{ConfigData, ConfigOverrides, ConfigSnapshot};

use crate::MODULE_NAME;

/// Levels accepted for the `level` key
pub const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read logging settings: {0}")]
    Conversion(#[from] serde_json::Error),
    #[error("Unknown log level '{0}'")]
    UnknownLevel(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timestamps: true,
        }
    }
}

impl LoggingSettings {
    /// Read settings from the module's resolved configuration.
    ///
    /// Keys other than `level` and `timestamps` are ignored.
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Result<Self, SettingsError> {
        let value = snapshot.as_data().clone().into_value();
        Ok(serde_json::from_value(value)?)
    }

    /// Read settings from the defaults plus this module's host overrides,
    /// without booting it
    pub fn from_overrides(overrides: &ConfigOverrides) -> Result<Self, SettingsError> {
        let merged = Self::default().to_config().merged_with(&overrides.resolve(MODULE_NAME));
        Ok(serde_json::from_value(merged.into_value())?)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, SettingsError> {
        self.level
            .parse::<LevelFilter>()
            .map_err(|_| SettingsError::UnknownLevel(self.level.clone()))
    }

    /// The settings as config defaults for the module descriptor
    pub fn to_config(&self) -> ConfigData {
        let mut values = Map::new();
        values.insert("level".to_string(), Value::String(self.level.clone()));
        values.insert("timestamps".to_string(), Value::Bool(self.timestamps));
        ConfigData::from_map(values)
    }
}
