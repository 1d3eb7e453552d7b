use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::data::{ConfigData, Slot, merge_maps};
use crate::config::error::ConfigError;
use crate::config::schema::ConfigSchema;

/// Three-level configuration for one module.
///
/// `get` resolves a key through `runtime`, then `overrides`, then `defaults`,
/// and always agrees with [`snapshot`](Self::snapshot): tables found in
/// several layers are merged, and a scalar in a higher layer hides whatever
/// the lower layers hold beneath it.
/// Defaults and overrides are fixed at construction; only the runtime layer
/// changes afterwards, through [`set`](Self::set) and [`reset`](Self::reset).
#[derive(Debug, Clone, Default)]
pub struct ConfigLayer {
    defaults: ConfigData,
    overrides: ConfigData,
    runtime: ConfigData,
}

impl ConfigLayer {
    /// Build a layer without validation
    pub fn new(defaults: ConfigData, overrides: ConfigData) -> Self {
        Self {
            defaults,
            overrides,
            runtime: ConfigData::new(),
        }
    }

    /// Build a layer, checking `schema` against defaults merged with overrides
    pub fn with_schema(
        defaults: ConfigData,
        overrides: ConfigData,
        schema: &ConfigSchema,
    ) -> Result<Self, ConfigError> {
        schema.check(&defaults.merged_with(&overrides))?;
        Ok(Self::new(defaults, overrides))
    }

    // Folds the layers bottom-up the same way `snapshot` merges them, but only
    // along the path of `key`.
    fn resolve(&self, key: &str) -> Option<Value> {
        let mut resolved: Option<Value> = None;
        for layer in [&self.defaults, &self.overrides, &self.runtime] {
            match layer.slot(key) {
                Slot::Value(value) => {
                    if let (Some(Value::Object(lower)), Value::Object(upper)) = (resolved.as_mut(), value) {
                        merge_maps(lower, upper);
                    } else {
                        resolved = Some(value.clone());
                    }
                }
                Slot::Shadowed => resolved = None,
                Slot::Absent => {}
            }
        }
        resolved
    }

    /// Resolve a key, failing if no layer holds it
    pub fn get(&self, key: &str) -> Result<Value, ConfigError> {
        self.resolve(key).ok_or_else(|| ConfigError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// Resolve a key, falling back to `fallback` if no layer holds it
    pub fn get_or(&self, key: &str, fallback: Value) -> Value {
        self.resolve(key).unwrap_or(fallback)
    }

    /// Resolve a key and deserialize it into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(|e| ConfigError::ValueType {
            key: key.to_string(),
            source: e,
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// Write a transient value into the runtime layer
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        self.runtime.set(key, value)
    }

    /// Drop one runtime value, exposing whatever the lower layers hold
    pub fn reset(&mut self, key: &str) -> Option<Value> {
        self.runtime.remove(key)
    }

    /// Drop every runtime value
    pub fn reset_all(&mut self) {
        self.runtime = ConfigData::new();
    }

    pub fn defaults(&self) -> &ConfigData {
        &self.defaults
    }

    pub fn overrides(&self) -> &ConfigData {
        &self.overrides
    }

    pub fn runtime(&self) -> &ConfigData {
        &self.runtime
    }

    /// Freeze the current merged view
    pub fn snapshot(&self) -> ConfigSnapshot {
        let mut merged = self.defaults.merged_with(&self.overrides);
        merged.merge(&self.runtime);
        ConfigSnapshot {
            data: Arc::new(merged),
        }
    }
}

/// Immutable merged view of a [`ConfigLayer`], cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    data: Arc<ConfigData>,
}

impl ConfigSnapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.lookup(key)
    }

    pub fn require(&self, key: &str) -> Result<&Value, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::KeyNotFound {
            key: key.to_string(),
        })
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.require(key)?;
        serde_json::from_value(value.clone()).map_err(|e| ConfigError::ValueType {
            key: key.to_string(),
            source: e,
        })
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.data.get_or(key, default)
    }

    pub fn as_data(&self) -> &ConfigData {
        &self.data
    }
}
