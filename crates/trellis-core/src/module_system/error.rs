//! # Trellis Core Module System Errors
//!
//! [`ModuleSystemError`] covers registration (duplicates, unknown or
//! incompatible dependencies), lookups, manifest parsing and the boot
//! sequence. Registration errors leave the registry untouched; a boot error
//! stops the boot sequence at the failing module.
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::kernel::error::BoxError;
use crate::module_system::version::VersionError;

/// The boot step during which a module failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStep {
    /// Merging defaults with overrides and validating the result
    Config,
    Routes,
    Views,
    Migrations,
    Translations,
    /// Running the module's own provider
    Provider,
}

impl fmt::Display for BootStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BootStep::Config => "config",
            BootStep::Routes => "routes",
            BootStep::Views => "views",
            BootStep::Migrations => "migrations",
            BootStep::Translations => "translations",
            BootStep::Provider => "provider",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum ModuleSystemError {
    #[error("Module '{name}' is already registered")]
    DuplicateModule { name: String },

    #[error("Module '{module}' depends on '{dependency}', which is not registered")]
    UnknownDependency { module: String, dependency: String },

    #[error("Module '{module}' requires '{dependency}' version '{required}' but found '{found}'")]
    IncompatibleDependency {
        module: String,
        dependency: String,
        required: String,
        found: String,
    },

    #[error("Module '{name}' not found")]
    ModuleNotFound { name: String },

    #[error("Module '{name}' has not been booted")]
    ModuleNotBooted { name: String },

    #[error("Module '{module}' failed to boot during {step}: {source}")]
    ModuleBoot {
        module: String,
        step: BootStep,
        #[source]
        source: BoxError,
    },

    #[error("Invalid module manifest{}: {message}", path.as_ref().map(|p| format!(" '{}'", p.display())).unwrap_or_default())]
    InvalidManifest {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Circular dependency detected between modules: {}", .modules.join(", "))]
    DependencyCycle { modules: Vec<String> },

    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    #[error("I/O error during '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl ModuleSystemError {
    pub(crate) fn boot(module: &str, step: BootStep, source: impl Into<BoxError>) -> Self {
        ModuleSystemError::ModuleBoot {
            module: module.to_string(),
            step,
            source: source.into(),
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        ModuleSystemError::ModuleNotFound { name: name.to_string() }
    }
}
