use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::data::{ConfigData, kind_of};
use crate::config::error::ConfigError;

/// Check applied to a single config value. `Err` carries a human readable reason.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Declares the keys a module needs and the shape of their values.
///
/// Checked once, against defaults merged with overrides, when a
/// [`ConfigLayer`](crate::config::ConfigLayer) is built. Runtime values set
/// afterwards are not re-validated.
#[derive(Clone, Default)]
pub struct ConfigSchema {
    required: Vec<String>,
    validators: Vec<(String, Validator)>,
}

impl fmt::Debug for ConfigSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSchema")
            .field("required", &self.required)
            .field("validated_keys", &self.validators.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as required
    pub fn require(mut self, key: &str) -> Self {
        if !self.required.iter().any(|k| k == key) {
            self.required.push(key.to_string());
        }
        self
    }

    /// Attach a custom validator to a key. It only runs when the key is present.
    pub fn validate_with<F>(mut self, key: &str, validator: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push((key.to_string(), Arc::new(validator)));
        self
    }

    /// Restrict a key to one of the given strings
    pub fn one_of(self, key: &str, allowed: &[&str]) -> Self {
        let allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
        self.validate_with(key, move |value| match value.as_str() {
            Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
            Some(s) => Err(format!("'{}' is not one of [{}]", s, allowed.join(", "))),
            None => Err(format!("expected a string, found {}", kind_of(value))),
        })
    }

    /// Require a boolean value at a key
    pub fn boolean(self, key: &str) -> Self {
        self.validate_with(key, |value| {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(format!("expected a boolean, found {}", kind_of(value)))
            }
        })
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.validators.is_empty()
    }

    /// Check `config`, collecting every failure before reporting
    pub fn check(&self, config: &ConfigData) -> Result<(), ConfigError> {
        let mut reasons = Vec::new();

        for key in &self.required {
            if !config.contains_key(key) {
                reasons.push(format!("missing required key '{}'", key));
            }
        }

        for (key, validator) in &self.validators {
            if let Some(value) = config.lookup(key) {
                if let Err(reason) = validator(value) {
                    reasons.push(format!("key '{}': {}", key, reason));
                }
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::InvalidConfig { module: None, reasons })
        }
    }
}
