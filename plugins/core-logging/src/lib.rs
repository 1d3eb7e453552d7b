//! # Trellis Core Logging Module
//!
//! Statically linked module that installs the process-wide `tracing`
//! subscriber when it boots, and bridges the `log` facade into it so the
//! rest of Trellis (which logs through `log`) ends up in the same output.
//!
//! Configuration keys:
//!
//! - `level`: one of `error`, `warn`, `info`, `debug`, `trace` (default `info`).
//!   `RUST_LOG`, when set, takes precedence.
//! - `timestamps`: prefix each line with a timestamp (default `true`).
pub mod settings;

use log::info;
use tracing_log::AsLog;
use tracing_subscriber::EnvFilter;
use trellis_core::{BootContext, BoxError, ConfigOverrides, ConfigSchema, ModuleDescriptor, ModuleProvider};

pub use settings::{LEVELS, LoggingSettings, SettingsError};

pub const MODULE_NAME: &str = "core-logging";

/// Descriptor to register with the host before any other module
pub fn descriptor() -> ModuleDescriptor {
    ModuleDescriptor::new(MODULE_NAME)
        .with_description("Sets up process logging")
        .with_config_defaults(LoggingSettings::default().to_config())
        .with_config_schema(
            ConfigSchema::new()
                .require("level")
                .one_of("level", &LEVELS)
                .boolean("timestamps"),
        )
        .with_provider(LoggingProvider)
}

#[derive(Debug, Default)]
pub struct LoggingProvider;

impl ModuleProvider for LoggingProvider {
    fn boot(&self, ctx: &mut BootContext<'_>) -> Result<(), BoxError> {
        let settings = LoggingSettings::from_snapshot(ctx.config())?;
        if install(&settings)? {
            info!(
                "Logging initialised at level '{}' (timestamps: {})",
                settings.level, settings.timestamps
            );
        } else {
            info!("A global subscriber is already installed; keeping it");
        }
        Ok(())
    }
}

/// Install the global subscriber and the `log` bridge.
///
/// Returns `Ok(false)` when a subscriber was already installed, in which case
/// nothing changes.
pub fn install(settings: &LoggingSettings) -> Result<bool, SettingsError> {
    settings.level_filter()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    // `log` records are dropped before reaching the filter unless the bridge
    // lets through everything the filter might enable
    let bridge_level = filter
        .max_level_hint()
        .map_or(log::LevelFilter::Trace, |hint| hint.as_log());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    let installed = if settings.timestamps {
        tracing::subscriber::set_global_default(builder.finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.without_time().finish()).is_ok()
    };
    if !installed {
        return Ok(false);
    }

    if let Err(e) = tracing_log::LogTracer::builder().with_max_level(bridge_level).init() {
        tracing::warn!("log records will not be forwarded: {}", e);
    }
    Ok(true)
}

/// Install logging from the host's overrides before anything is registered.
///
/// Settings that cannot be read fall back to the defaults here; the module's
/// config step still rejects them when it boots. Returns whether this call
/// installed the subscriber.
pub fn install_early(overrides: &ConfigOverrides) -> bool {
    let settings = LoggingSettings::from_overrides(overrides)
        .ok()
        .filter(|s| s.level_filter().is_ok())
        .unwrap_or_default();
    install(&settings).unwrap_or(false)
}
