//! # Trellis Core Configuration
//!
//! Layered per-module configuration with dot-path lookup.
//!
//! - **[`data`]**: [`ConfigData`], a nested tree of `serde_json::Value`s with
//!   dot-path access and deep merging, plus [`ConfigFormat`] for JSON, YAML
//!   and TOML files.
//! - **[`layer`]**: [`ConfigLayer`] resolves a key through the runtime,
//!   override and default layers; [`ConfigSnapshot`] is a frozen merged view.
//! - **[`schema`]**: [`ConfigSchema`] declares required keys and validators,
//!   checked once when a layer is built.
//! - **[`overrides`]**: [`ConfigOverrides`] collects host-supplied overrides
//!   per module from files and environment variables.
//! - **[`error`]**: [`ConfigError`](error::ConfigError).
pub mod data;
pub mod error;
pub mod layer;
pub mod overrides;
pub mod schema;

pub use data::{ConfigData, ConfigFormat};
pub use error::ConfigError;
pub use layer::{ConfigLayer, ConfigSnapshot};
pub use overrides::ConfigOverrides;
pub use schema::{ConfigSchema, Validator};

#[cfg(test)]
mod tests;
