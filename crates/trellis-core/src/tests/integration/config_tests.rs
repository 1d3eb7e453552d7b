#![cfg(test)]

use std::fs;

use serde_json::json;
use tempfile::tempdir;

use super::common::MockHost;
use crate::config::{ConfigData, ConfigOverrides, ConfigSchema};
use crate::kernel::bootstrap::Application;
use crate::kernel::error::{Error, Result};
use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::error::{BootStep, ModuleSystemError};

fn blog_module() -> ModuleDescriptor {
    ModuleDescriptor::new("blog")
        .with_config_defaults(
            ConfigData::from_value(json!({
                "per_page": 10,
                "comments": { "enabled": true, "moderation": "manual" }
            }))
            .unwrap(),
        )
        .with_config_schema(
            ConfigSchema::new()
                .require("per_page")
                .one_of("comments.moderation", &["manual", "auto", "off"])
                .boolean("comments.enabled"),
        )
}

#[test]
fn test_overrides_from_dir_and_env_layer_in_order() -> Result<()> {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("blog.json"),
        r#"{ "per_page": 25, "comments": { "moderation": "auto" } }"#,
    )
    .unwrap();

    let mut overrides = ConfigOverrides::load_dir(dir.path())?;
    let applied = overrides.apply_env_vars(
        "APP",
        vec![
            ("APP__BLOG__PER_PAGE".to_string(), "50".to_string()),
            ("OTHER__BLOG__PER_PAGE".to_string(), "1".to_string()),
        ],
    )?;
    assert_eq!(applied, 1);

    let mut app = Application::with_overrides(overrides);
    app.register(blog_module())?;
    app.boot(&mut MockHost::new())?;

    let config = app.config("blog")?;
    assert_eq!(config.get("per_page")?, json!(50));
    assert_eq!(config.get("comments.moderation")?, json!("auto"));
    // Sibling defaults survive a partial override of the same table
    assert_eq!(config.get("comments.enabled")?, json!(true));

    let snapshot = config.snapshot();
    assert_eq!(snapshot.get_as::<u32>("per_page")?, 50);
    Ok(())
}

#[test]
fn test_invalid_override_stops_boot() -> Result<()> {
    let mut overrides = ConfigOverrides::new();
    overrides.set_value("blog", "comments.enabled", json!("yes"))?;
    overrides.set_value("blog", "comments.moderation", json!("sometimes"))?;

    let mut app = Application::with_overrides(overrides);
    app.register(ModuleDescriptor::new("core"))?;
    app.register(blog_module().depends_on("core"))?;

    let err = app.boot(&mut MockHost::new()).unwrap_err();
    let Error::ModuleSystem(ModuleSystemError::ModuleBoot { module, step, source }) = err else {
        panic!("expected ModuleBoot");
    };
    assert_eq!(module, "blog");
    assert_eq!(step, BootStep::Config);
    let message = source.to_string();
    assert!(message.contains("key 'comments.enabled': expected a boolean, found a string"), "{}", message);
    assert!(message.contains("'sometimes' is not one of [manual, auto, off]"), "{}", message);

    assert!(app.lifecycle().is_booted("core"));
    assert!(app.config("blog").is_err());
    Ok(())
}

#[test]
fn test_override_changes_apply_to_later_boots_only() -> Result<()> {
    let mut app = Application::new();
    app.register(blog_module())?;
    app.boot(&mut MockHost::new())?;

    app.overrides_mut().set_value("blog", "per_page", json!(99))?;
    app.register(ModuleDescriptor::new("feed").with_config_defaults(
        ConfigData::from_value(json!({ "size": 20 })).unwrap(),
    ))?;
    app.overrides_mut().set_value("feed", "size", json!(5))?;
    app.boot(&mut MockHost::new())?;

    assert_eq!(app.config("blog")?.get("per_page")?, json!(10));
    assert_eq!(app.config("feed")?.get("size")?, json!(5));
    Ok(())
}

#[test]
fn test_runtime_values_shadow_and_reset() -> Result<()> {
    let mut app = Application::new();
    app.register(blog_module())?;
    app.boot(&mut MockHost::new())?;

    let config = app.config_mut("blog")?;
    config.set("per_page", 3)?;
    assert_eq!(config.get("per_page")?, json!(3));
    assert_eq!(config.reset("per_page"), Some(json!(3)));
    assert_eq!(config.get("per_page")?, json!(10));
    Ok(())
}
