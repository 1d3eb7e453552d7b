use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Human readable name, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse a document in this format into any deserializable type
    pub(crate) fn parse<T: DeserializeOwned>(&self, data: &str) -> Result<T, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse {
            format: self.name(),
            message,
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| parse_err(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| parse_err(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| parse_err(e.to_string())),
        }
    }
}

/// Nested configuration tree addressed by dot-separated keys.
///
/// `"cache.ttl"` names the `ttl` entry of the `cache` object. Every
/// intermediate segment must be an object for a lookup to succeed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigData {
    values: Map<String, Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Create a configuration from an already nested JSON object
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Create a configuration from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::new()),
            other => Err(ConfigError::InvalidConfig {
                module: None,
                reasons: vec![format!("expected a table of settings, found {}", kind_of(&other))],
            }),
        }
    }

    /// Build a configuration from `(dot.path, value)` pairs
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut data = Self::new();
        for (key, value) in pairs {
            data.insert(key.as_ref(), value)?;
        }
        Ok(data)
    }

    /// Borrow the underlying object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Convert into a JSON object value
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    /// Check whether the tree holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up the value stored at a dot-path
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        let mut segments = split_key(key).ok()?.into_iter();
        let first = segments.next()?;
        let mut current = self.values.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Like [`lookup`](Self::lookup), but tells a missing key apart from one
    /// hidden by a scalar stored at one of its parents
    pub(crate) fn slot(&self, key: &str) -> Slot<'_> {
        let Ok(segments) = split_key(key) else {
            return Slot::Absent;
        };
        let Some((last, parents)) = segments.split_last() else {
            return Slot::Absent;
        };
        let mut current = &self.values;
        for segment in parents {
            match current.get(*segment) {
                Some(Value::Object(map)) => current = map,
                Some(_) => return Slot::Shadowed,
                None => return Slot::Absent,
            }
        }
        current.get(*last).map_or(Slot::Absent, Slot::Value)
    }

    /// Get a configuration value, deserialized into `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Check if a dot-path resolves to a value
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Store a value at a dot-path, creating intermediate objects.
    ///
    /// A non-object value sitting on the path is replaced by an object.
    pub fn insert(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        let segments = split_key(key)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| invalid_key(key, "key is empty"))?;

        let mut current = &mut self.values;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return Err(invalid_key(key, "intermediate segment is not a table")),
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }

    /// Serialize `value` and store it at a dot-path
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let json_value = serde_json::to_value(value).map_err(|e| ConfigError::ValueType {
            key: key.to_string(),
            source: e,
        })?;
        self.insert(key, json_value)
    }

    /// Remove the value at a dot-path. Objects left empty by the removal are pruned.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let segments = split_key(key).ok()?;
        remove_path(&mut self.values, &segments)
    }

    /// Flattened dot-paths of every leaf value
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_leaf_keys(&self.values, "", &mut keys);
        keys
    }

    /// Deep-merge `other` into this tree; `other` wins on conflicting leaves
    pub fn merge(&mut self, other: &ConfigData) {
        merge_maps(&mut self.values, &other.values);
    }

    /// Return a merged copy, leaving both inputs untouched
    pub fn merged_with(&self, other: &ConfigData) -> ConfigData {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let ser_err = |message: String| ConfigError::Serialize {
            format: format.name(),
            message,
        };
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&self).map_err(|e| ser_err(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(&self).map_err(|e| ser_err(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(&self).map_err(|e| ser_err(e.to_string())),
        }
    }

    /// Deserialize from string based on format. Blank documents yield an empty tree.
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        if data.trim().is_empty() {
            return Ok(Self::new());
        }
        format.parse(data)
    }

    /// Load a configuration file, picking the format from its extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(e, "read config", path.to_path_buf()))?;
        Self::deserialize(&content, format)
    }
}

impl From<Map<String, Value>> for ConfigData {
    fn from(values: Map<String, Value>) -> Self {
        Self::from_map(values)
    }
}

fn split_key(key: &str) -> Result<Vec<&str>, ConfigError> {
    if key.is_empty() {
        return Err(invalid_key(key, "key is empty"));
    }
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid_key(key, "key contains an empty segment"));
    }
    Ok(segments)
}

fn invalid_key(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn remove_path(map: &mut Map<String, Value>, segments: &[&str]) -> Option<Value> {
    match segments {
        [] => None,
        [last] => map.remove(*last),
        [head, rest @ ..] => {
            let child = map.get_mut(*head)?.as_object_mut()?;
            let removed = remove_path(child, rest);
            if removed.is_some() && child.is_empty() {
                map.remove(*head);
            }
            removed
        }
    }
}

/// What a single [`ConfigData`] holds at a dot-path
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Slot<'a> {
    Value(&'a Value),
    /// A parent segment holds a non-object value
    Shadowed,
    Absent,
}

pub(crate) fn merge_maps(target: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) = (target.get_mut(key), value) {
            merge_maps(existing, incoming);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

fn collect_leaf_keys(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(child) if !child.is_empty() => collect_leaf_keys(child, &path, out),
            _ => out.push(path),
        }
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}
