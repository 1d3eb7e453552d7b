#![cfg(test)]

use serde_json::{Value, json};

use super::common::MockHost;
use crate::config::ConfigData;
use crate::extension::ExtensionError;
use crate::kernel::bootstrap::Application;
use crate::kernel::error::{Error, Result};
use crate::module_system::descriptor::ModuleDescriptor;

const MACROS: &str = "query-builder.macros";

#[test]
fn test_modules_extend_each_other_through_points() -> Result<()> {
    let mut app = Application::new();
    app.register(ModuleDescriptor::new("core").with_provider_fn(|ctx| {
        ctx.expose(MACROS);
        Ok(())
    }))?;
    for (name, suffix) in [("blog", "posts"), ("shop", "orders")] {
        app.register(
            ModuleDescriptor::new(name)
                .depends_on("core")
                .with_config_defaults(ConfigData::from_value(json!({ "suffix": suffix })).unwrap())
                .with_provider_fn(|ctx| {
                    let suffix: String = ctx.config().get_as("suffix")?;
                    ctx.attach(MACROS, move |args: &[Value]| {
                        let base = args.first().and_then(Value::as_str).unwrap_or("");
                        Ok(json!(format!("{}.{}", base, suffix)))
                    })?;
                    Ok(())
                }),
        )?;
    }

    app.boot(&mut MockHost::new())?;

    let results = app.extensions().invoke(MACROS, &[json!("scope")])?;
    assert_eq!(results, vec![json!("scope.posts"), json!("scope.orders")]);
    assert_eq!(
        app.extensions().get(MACROS).map(|p| p.owners()),
        Some(vec![Some("blog"), Some("shop")])
    );
    Ok(())
}

#[test]
fn test_failing_handler_is_reported_with_owner() -> Result<()> {
    let mut app = Application::new();
    app.register(ModuleDescriptor::new("core").with_provider_fn(|ctx| {
        ctx.expose(MACROS);
        Ok(())
    }))?;
    app.register(ModuleDescriptor::new("blog").depends_on("core").with_provider_fn(|ctx| {
        ctx.attach(MACROS, |_| Err("macro table corrupt".into()))?;
        Ok(())
    }))?;
    app.boot(&mut MockHost::new())?;

    match app.extensions().invoke(MACROS, &[]) {
        Err(ExtensionError::HandlerFailed { owner, source, .. }) => {
            assert_eq!(owner.as_deref(), Some("blog"));
            assert_eq!(source.to_string(), "macro table corrupt");
        }
        other => panic!("expected HandlerFailed, got {:?}", other),
    }

    let err: Error = app.extensions().invoke("menu.items", &[]).unwrap_err().into();
    assert!(matches!(err, Error::Extension(ExtensionError::UnknownExtensionPoint { .. })));
    Ok(())
}

#[test]
fn test_host_can_attach_and_detach_after_boot() -> Result<()> {
    let mut app = Application::new();
    app.register(ModuleDescriptor::new("core").with_provider_fn(|ctx| {
        ctx.expose(MACROS);
        Ok(())
    }))?;
    app.boot(&mut MockHost::new())?;

    let id = app.extensions_mut().attach(MACROS, |_| Ok(json!("host")))?;
    assert_eq!(app.extensions().handler_count(MACROS), Some(1));
    assert!(app.extensions_mut().detach(id));
    assert!(app.extensions().invoke(MACROS, &[])?.is_empty());
    Ok(())
}
