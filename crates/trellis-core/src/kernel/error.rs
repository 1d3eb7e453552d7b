//! # Trellis Core Kernel Errors
//!
//! Defines the top-level [`Error`] returned by kernel operations. Each
//! subsystem keeps its own typed error ([`ModuleSystemError`],
//! [`ConfigError`], [`ExtensionError`]) and converts into this one with `?`.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::extension::error::ExtensionError;
use crate::module_system::error::ModuleSystemError;

/// Error type produced by host callbacks, module providers and extension handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error for the Trellis core
#[derive(Debug, ThisError)]
pub enum Error {
    /// Registration, lookup, manifest or boot failure
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Configuration lookup or validation failure
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Extension point failure
    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
