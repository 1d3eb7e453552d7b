/// Application name
pub const APP_NAME: &str = "Trellis";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version assigned to modules whose descriptor does not declare one
pub const DEFAULT_MODULE_VERSION: &str = "0.1.0";

/// Default directory scanned for module manifests
pub const DEFAULT_MODULES_DIR: &str = "modules";

/// Default directory scanned for per-module config overrides
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Default prefix for environment variable overrides
pub const DEFAULT_ENV_PREFIX: &str = "TRELLIS";

/// Separator between segments of an environment override name
pub const ENV_SEPARATOR: &str = "__";
