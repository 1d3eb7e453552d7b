#![cfg(test)]

use serde_json::json;
use tempfile::tempdir;

use crate::config::data::{ConfigData, ConfigFormat};
use crate::config::error::ConfigError;

fn sample() -> ConfigData {
    ConfigData::from_value(json!({
        "mode": "sync",
        "cache": { "ttl": 60, "driver": "file" },
        "features": ["search", "rss"]
    }))
    .expect("sample config should be an object")
}

#[test]
fn test_lookup_dot_paths() {
    let config = sample();
    assert_eq!(config.lookup("mode"), Some(&json!("sync")));
    assert_eq!(config.lookup("cache.ttl"), Some(&json!(60)));
    assert_eq!(config.lookup("cache"), Some(&json!({ "ttl": 60, "driver": "file" })));
    assert!(config.lookup("cache.missing").is_none());
    // Walking through a non-object yields nothing
    assert!(config.lookup("mode.inner").is_none());
    assert!(config.lookup("").is_none());
    assert!(config.lookup("cache..ttl").is_none());
}

#[test]
fn test_typed_get() {
    let config = sample();
    assert_eq!(config.get::<u64>("cache.ttl"), Some(60));
    assert_eq!(config.get::<Vec<String>>("features").unwrap(), vec!["search", "rss"]);
    // Wrong type reads as absent
    assert_eq!(config.get::<bool>("mode"), None);
    assert_eq!(config.get_or("cache.size", 128u32), 128);
}

#[test]
fn test_insert_creates_intermediate_tables() -> Result<(), ConfigError> {
    let mut config = ConfigData::new();
    config.insert("db.connections.primary.host", json!("localhost"))?;
    assert_eq!(config.lookup("db.connections.primary.host"), Some(&json!("localhost")));

    // A scalar on the path is replaced by a table
    config.set("mode", "sync")?;
    config.set("mode.kind", "queue")?;
    assert_eq!(config.lookup("mode.kind"), Some(&json!("queue")));
    Ok(())
}

#[test]
fn test_insert_rejects_malformed_keys() {
    let mut config = ConfigData::new();
    assert!(matches!(config.insert("", json!(1)), Err(ConfigError::InvalidKey { .. })));
    assert!(matches!(config.insert("a..b", json!(1)), Err(ConfigError::InvalidKey { .. })));
    assert!(config.is_empty());
}

#[test]
fn test_remove_prunes_empty_parents() -> Result<(), ConfigError> {
    let mut config = ConfigData::new();
    config.set("a.b.c", 1)?;
    config.set("a.d", 2)?;

    assert_eq!(config.remove("a.b.c"), Some(json!(1)));
    assert!(!config.contains_key("a.b"), "emptied table should be pruned");
    assert!(config.contains_key("a.d"));

    assert_eq!(config.remove("a.d"), Some(json!(2)));
    assert!(config.is_empty());
    assert_eq!(config.remove("a.d"), None);
    Ok(())
}

#[test]
fn test_deep_merge() {
    let mut base = sample();
    let overlay = ConfigData::from_value(json!({
        "cache": { "ttl": 300 },
        "features": ["api"],
        "debug": true
    }))
    .unwrap();

    base.merge(&overlay);
    assert_eq!(base.lookup("cache.ttl"), Some(&json!(300)));
    assert_eq!(base.lookup("cache.driver"), Some(&json!("file")), "sibling keys survive");
    assert_eq!(base.lookup("features"), Some(&json!(["api"])), "arrays are replaced, not appended");
    assert_eq!(base.lookup("debug"), Some(&json!(true)));
    assert_eq!(base.lookup("mode"), Some(&json!("sync")));
}

#[test]
fn test_keys_are_flattened() {
    let mut keys = sample().keys();
    keys.sort();
    assert_eq!(keys, vec!["cache.driver", "cache.ttl", "features", "mode"]);
}

#[test]
fn test_from_value_rejects_scalars() {
    assert!(ConfigData::from_value(json!(null)).unwrap().is_empty());
    assert!(matches!(
        ConfigData::from_value(json!([1, 2])),
        Err(ConfigError::InvalidConfig { .. })
    ));
}

#[test]
fn test_serialization_formats() -> Result<(), ConfigError> {
    let config = sample();

    let json_str = config.serialize(ConfigFormat::Json)?;
    assert_eq!(ConfigData::deserialize(&json_str, ConfigFormat::Json)?, config);

    #[cfg(feature = "yaml-config")]
    {
        let yaml_str = config.serialize(ConfigFormat::Yaml)?;
        let parsed = ConfigData::deserialize(&yaml_str, ConfigFormat::Yaml)?;
        assert_eq!(parsed.get::<u64>("cache.ttl"), Some(60));
    }

    #[cfg(feature = "toml-config")]
    {
        let parsed = ConfigData::deserialize("[cache]\nttl = 90\n", ConfigFormat::Toml)?;
        assert_eq!(parsed.get::<u64>("cache.ttl"), Some(90));
    }

    assert!(ConfigData::deserialize("   \n", ConfigFormat::Json)?.is_empty());
    assert!(matches!(
        ConfigData::deserialize("{ not json", ConfigFormat::Json),
        Err(ConfigError::Parse { format: "JSON", .. })
    ));
    Ok(())
}

#[test]
fn test_from_path() -> Result<(), ConfigError> {
    let dir = tempdir().expect("Failed to create temp directory");
    let json_path = dir.path().join("blog.json");
    std::fs::write(&json_path, r#"{ "per_page": 10 }"#).unwrap();
    assert_eq!(ConfigData::from_path(&json_path)?.get::<u32>("per_page"), Some(10));

    let unknown = dir.path().join("blog.ini");
    std::fs::write(&unknown, "per_page=10").unwrap();
    assert!(matches!(ConfigData::from_path(&unknown), Err(ConfigError::UnsupportedFormat { .. })));

    let missing = dir.path().join("missing.json");
    assert!(matches!(ConfigData::from_path(&missing), Err(ConfigError::Io { .. })));
    Ok(())
}

#[test]
fn test_format_from_path() {
    use std::path::Path;
    assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), Some(ConfigFormat::Json));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_path(Path::new("a.txt")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
}
