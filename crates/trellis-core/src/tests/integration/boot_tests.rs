#![cfg(test)]

use std::fs;

use tempfile::tempdir;

use super::common::MockHost;
use crate::kernel::bootstrap::Application;
use crate::kernel::error::{Error, Result};
use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::error::{BootStep, ModuleSystemError};

fn blog_app() -> Result<Application> {
    let mut app = Application::new();
    app.register(
        ModuleDescriptor::new("core")
            .with_routes("modules/core/routes/web.php")
            .with_migrations("modules/core/database/migrations"),
    )?;
    app.register(
        ModuleDescriptor::new("blog")
            .depends_on("core")
            .with_routes("modules/blog/routes/web.php")
            .with_views("modules/blog/resources/views")
            .with_translations("modules/blog/lang"),
    )?;
    app.register(
        ModuleDescriptor::new("admin")
            .depends_on("core")
            .with_views("modules/admin/resources/views"),
    )?;
    Ok(app)
}

#[test]
fn test_full_boot_sequence() -> Result<()> {
    let mut app = blog_app()?;
    let mut host = MockHost::new();
    app.boot(&mut host)?;

    assert_eq!(
        host.calls(),
        vec![
            "routes:modules/core/routes/web.php",
            "migrations:modules/core/database/migrations",
            "routes:modules/blog/routes/web.php",
            "views:blog:modules/blog/resources/views",
            "translations:blog:modules/blog/lang",
            "views:admin:modules/admin/resources/views",
        ]
    );
    assert_eq!(app.lifecycle().booted(), &["core".to_string(), "blog".to_string(), "admin".to_string()]);
    Ok(())
}

#[test]
fn test_boot_twice_runs_callbacks_once() -> Result<()> {
    let mut app = blog_app()?;
    let mut host = MockHost::new();
    app.boot(&mut host)?;
    let before = host.calls().len();
    let report = app.boot(&mut host)?;
    assert_eq!(host.calls().len(), before);
    assert!(report.booted.is_empty());
    Ok(())
}

#[test]
fn test_late_registration_boots_on_next_pass() -> Result<()> {
    let mut app = blog_app()?;
    let mut host = MockHost::new();
    app.boot(&mut host)?;

    app.register(ModuleDescriptor::new("shop").depends_on("blog").with_routes("modules/shop/routes.php"))?;
    let report = app.boot(&mut host)?;
    assert_eq!(report.booted, vec!["shop"]);
    assert_eq!(host.calls().last().map(String::as_str), Some("routes:modules/shop/routes.php"));
    Ok(())
}

#[test]
fn test_failure_can_be_retried_after_fix() -> Result<()> {
    struct FlakyHost {
        fail: bool,
        inner: MockHost,
    }

    impl crate::module_system::lifecycle::HostCallbacks for FlakyHost {
        fn load_routes(&mut self, paths: &[String]) -> std::result::Result<(), crate::BoxError> {
            if self.fail && paths.iter().any(|p| p.contains("blog")) {
                return Err("routes file unreadable".into());
            }
            self.inner.load_routes(paths)
        }

        fn load_views(&mut self, paths: &[String], namespace: &str) -> std::result::Result<(), crate::BoxError> {
            self.inner.load_views(paths, namespace)
        }

        fn load_migrations(&mut self, paths: &[String]) -> std::result::Result<(), crate::BoxError> {
            self.inner.load_migrations(paths)
        }
    }

    let mut app = blog_app()?;
    let mut host = FlakyHost { fail: true, inner: MockHost::new() };

    match app.boot(&mut host) {
        Err(Error::ModuleSystem(ModuleSystemError::ModuleBoot { module, step, .. })) => {
            assert_eq!(module, "blog");
            assert_eq!(step, BootStep::Routes);
        }
        other => panic!("expected blog to fail, got {:?}", other),
    }
    assert!(app.lifecycle().is_booted("core"));
    assert!(!app.lifecycle().is_booted("admin"));

    host.fail = false;
    let report = app.boot(&mut host)?;
    assert_eq!(report.booted, vec!["blog", "admin"]);
    assert_eq!(report.already_booted, vec!["core"]);
    Ok(())
}

#[cfg(all(feature = "yaml-config", feature = "toml-config"))]
#[test]
fn test_manifests_and_static_modules_together() -> Result<()> {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("blog.yaml"),
        "name: blog\ndependencies: [core]\nresources:\n  views: [blog/views]\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("admin.toml"),
        "name = \"admin\"\ndependencies = [\"blog\"]\nactive = false\n",
    )
    .unwrap();

    let mut app = Application::new();
    app.register(ModuleDescriptor::new("core"))?;
    app.load_manifests(dir.path())?;

    let mut host = MockHost::new();
    let report = app.boot(&mut host)?;
    assert_eq!(report.booted, vec!["core", "blog"]);
    assert_eq!(report.skipped_inactive, vec!["admin"]);
    assert_eq!(host.calls(), vec!["views:blog:blog/views"]);
    Ok(())
}
