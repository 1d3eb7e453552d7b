use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::data::{ConfigData, ConfigFormat};
use crate::config::error::ConfigError;
use crate::kernel::constants::ENV_SEPARATOR;

/// Host-supplied configuration overrides, keyed by module name.
///
/// Overrides come from a directory of per-module files
/// (`blog.toml`, `admin.json`, ...) and from environment variables of the
/// form `PREFIX__MODULE__KEY__SUBKEY`. They are merged over a module's
/// defaults when the module boots.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    modules: HashMap<String, ConfigData>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the overrides for a module
    pub fn set(&mut self, module: &str, data: ConfigData) {
        self.modules.insert(module.to_string(), data);
    }

    /// Deep-merge `data` into the overrides already held for a module
    pub fn merge(&mut self, module: &str, data: &ConfigData) {
        self.modules.entry(module.to_string()).or_default().merge(data);
    }

    /// Override a single key for a module
    pub fn set_value(&mut self, module: &str, key: &str, value: Value) -> Result<(), ConfigError> {
        self.modules.entry(module.to_string()).or_default().insert(key, value)
    }

    pub fn for_module(&self, module: &str) -> Option<&ConfigData> {
        self.modules.get(module)
    }

    /// Overrides for a module, or an empty tree if none were supplied
    pub fn resolve(&self, module: &str) -> ConfigData {
        self.modules.get(module).cloned().unwrap_or_default()
    }

    /// Names of modules with at least one override, sorted
    pub fn modules(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Load every recognised config file in `dir`; the file stem names the module.
    ///
    /// A missing directory yields no overrides.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut overrides = Self::new();
        if !dir.exists() {
            log::debug!("Config override directory {} does not exist, skipping", dir.display());
            return Ok(overrides);
        }

        let entries = fs::read_dir(dir).map_err(|e| ConfigError::io(e, "read config dir", dir.to_path_buf()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::io(e, "read config dir entry", dir.to_path_buf()))?;
            let path = entry.path();
            if path.is_file() && ConfigFormat::from_path(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let Some(module) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let data = ConfigData::from_path(&path)?;
            log::debug!("Loaded config overrides for module '{}' from {}", module, path.display());
            overrides.merge(module, &data);
        }
        Ok(overrides)
    }

    /// Collect overrides from the process environment
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let mut overrides = Self::new();
        overrides.apply_env(prefix)?;
        Ok(overrides)
    }

    /// Apply overrides from the process environment on top of what is held
    pub fn apply_env(&mut self, prefix: &str) -> Result<usize, ConfigError> {
        self.apply_env_vars(prefix, std::env::vars())
    }

    /// Apply `PREFIX__MODULE__KEY[__SUBKEY...]` variables from `vars`.
    ///
    /// The module segment is lower-cased with `_` mapped to `-`; key segments
    /// are lower-cased and joined with `.`. Values that parse as JSON are
    /// stored as such, anything else as a string. Returns the number applied.
    pub fn apply_env_vars<I>(&mut self, prefix: &str, vars: I) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let full_prefix = format!("{}{}", prefix, ENV_SEPARATOR);
        let mut applied = 0;

        for (name, raw) in vars {
            let Some(rest) = name.strip_prefix(&full_prefix) else {
                continue;
            };
            let mut segments = rest.split(ENV_SEPARATOR);
            let module = match segments.next() {
                Some(m) if !m.is_empty() => m.to_lowercase().replace('_', "-"),
                _ => {
                    log::warn!("Ignoring environment override '{}': no module segment", name);
                    continue;
                }
            };
            let key_segments: Vec<String> = segments.map(|s| s.to_lowercase()).collect();
            if key_segments.is_empty() || key_segments.iter().any(|s| s.is_empty()) {
                log::warn!("Ignoring environment override '{}': malformed key", name);
                continue;
            }

            let key = key_segments.join(".");
            let value = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
            self.set_value(&module, &key, value)?;
            applied += 1;
        }

        Ok(applied)
    }
}
