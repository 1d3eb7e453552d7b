//! # Trellis Core Configuration Errors
//!
//! [`ConfigError`] covers key lookups that find nothing, schema validation
//! failures, malformed keys and values, and config file problems.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config key '{key}' not found")]
    KeyNotFound { key: String },

    #[error("Invalid config{}: {}", module.as_deref().map(|m| format!(" for module '{}'", m)).unwrap_or_default(), reasons.join("; "))]
    InvalidConfig {
        module: Option<String>,
        reasons: Vec<String>,
    },

    #[error("Invalid config key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Config value at '{key}' has an unexpected type: {source}")]
    ValueType {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported config format for path: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to parse {format} config: {message}")]
    Parse { format: &'static str, message: String },

    #[error("Failed to serialize config to {format}: {message}")]
    Serialize { format: &'static str, message: String },

    #[error("I/O error during '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Attach the owning module's name to a validation failure
    pub fn for_module(self, name: &str) -> Self {
        match self {
            ConfigError::InvalidConfig { module: None, reasons } => ConfigError::InvalidConfig {
                module: Some(name.to_string()),
                reasons,
            },
            other => other,
        }
    }

    pub(crate) fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
