use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::{ConfigLayer, ConfigOverrides};
use crate::kernel::error::BoxError;
use crate::module_system::descriptor::{ModuleDescriptor, ResourceKind};
use crate::module_system::error::{BootStep, ModuleSystemError};
use crate::module_system::provider::BootContext;
use crate::module_system::registry::ModuleRegistry;

type Result<T> = std::result::Result<T, ModuleSystemError>;

/// Operations the host framework performs on a module's resources.
///
/// Paths are passed through from the descriptor unchanged. Returning `Err`
/// aborts the boot sequence with [`ModuleSystemError::ModuleBoot`].
pub trait HostCallbacks {
    fn load_routes(&mut self, paths: &[String]) -> std::result::Result<(), BoxError>;

    fn load_views(&mut self, paths: &[String], namespace: &str) -> std::result::Result<(), BoxError>;

    fn load_migrations(&mut self, paths: &[String]) -> std::result::Result<(), BoxError>;

    fn load_translations(&mut self, _paths: &[String], _namespace: &str) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

type PathsFn<'a> = Box<dyn FnMut(&[String]) -> std::result::Result<(), BoxError> + 'a>;
type NamespacedPathsFn<'a> = Box<dyn FnMut(&[String], &str) -> std::result::Result<(), BoxError> + 'a>;

/// [`HostCallbacks`] assembled from individual closures.
///
/// A loader that was not supplied is a no-op for that resource kind.
#[derive(Default)]
pub struct HostLoaders<'a> {
    routes: Option<PathsFn<'a>>,
    views: Option<NamespacedPathsFn<'a>>,
    migrations: Option<PathsFn<'a>>,
    translations: Option<NamespacedPathsFn<'a>>,
}

impl fmt::Debug for HostLoaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostLoaders")
            .field("routes", &self.routes.is_some())
            .field("views", &self.views.is_some())
            .field("migrations", &self.migrations.is_some())
            .field("translations", &self.translations.is_some())
            .finish()
    }
}

impl<'a> HostLoaders<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_routes<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[String]) -> std::result::Result<(), BoxError> + 'a,
    {
        self.routes = Some(Box::new(f));
        self
    }

    pub fn on_views<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[String], &str) -> std::result::Result<(), BoxError> + 'a,
    {
        self.views = Some(Box::new(f));
        self
    }

    pub fn on_migrations<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[String]) -> std::result::Result<(), BoxError> + 'a,
    {
        self.migrations = Some(Box::new(f));
        self
    }

    pub fn on_translations<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[String], &str) -> std::result::Result<(), BoxError> + 'a,
    {
        self.translations = Some(Box::new(f));
        self
    }
}

impl HostCallbacks for HostLoaders<'_> {
    fn load_routes(&mut self, paths: &[String]) -> std::result::Result<(), BoxError> {
        self.routes.as_mut().map_or(Ok(()), |f| f(paths))
    }

    fn load_views(&mut self, paths: &[String], namespace: &str) -> std::result::Result<(), BoxError> {
        self.views.as_mut().map_or(Ok(()), |f| f(paths, namespace))
    }

    fn load_migrations(&mut self, paths: &[String]) -> std::result::Result<(), BoxError> {
        self.migrations.as_mut().map_or(Ok(()), |f| f(paths))
    }

    fn load_translations(&mut self, paths: &[String], namespace: &str) -> std::result::Result<(), BoxError> {
        self.translations.as_mut().map_or(Ok(()), |f| f(paths, namespace))
    }
}

/// Outcome of one [`ModuleLifecycle::boot_all`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    /// Modules booted by this pass, in boot order
    pub booted: Vec<String>,
    /// Modules that had already booted in an earlier pass
    pub already_booted: Vec<String>,
    /// Inactive modules
    pub skipped_inactive: Vec<String>,
    /// Active modules left unbooted because a dependency did not boot
    pub skipped_unmet: Vec<String>,
}

/// Drives modules from registered to booted.
///
/// Keeps the set of booted modules so repeated passes only boot what is new,
/// and the resolved [`ConfigLayer`] of every booted module.
#[derive(Debug, Default)]
pub struct ModuleLifecycle {
    booted: HashSet<String>,
    boot_sequence: Vec<String>,
    configs: HashMap<String, ConfigLayer>,
}

impl ModuleLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boot every active module in dependency order.
    ///
    /// Stops at the first failure; modules after it, including its
    /// dependents, stay unbooted. Calling it again only boots modules that
    /// have not booted yet.
    pub fn boot_all(
        &mut self,
        registry: &mut ModuleRegistry,
        overrides: &ConfigOverrides,
        host: &mut dyn HostCallbacks,
    ) -> Result<BootReport> {
        let mut report = BootReport::default();

        for name in registry.boot_order() {
            if self.booted.contains(&name) {
                report.already_booted.push(name);
                continue;
            }

            let descriptor = registry.get(&name)?.clone();
            if !descriptor.is_active() {
                log::info!("Module '{}' is inactive, skipping boot", name);
                report.skipped_inactive.push(name);
                continue;
            }

            if let Some(missing) = descriptor
                .dependencies()
                .iter()
                .find(|dep| !self.booted.contains(&dep.name))
            {
                log::warn!(
                    "Module '{}' not booted: dependency '{}' has not booted",
                    name,
                    missing.name
                );
                report.skipped_unmet.push(name);
                continue;
            }

            self.boot_module(&descriptor, registry, overrides, host)?;
            report.booted.push(name);
        }

        log::info!(
            "Boot pass complete: {} booted, {} already booted, {} inactive, {} with unmet dependencies",
            report.booted.len(),
            report.already_booted.len(),
            report.skipped_inactive.len(),
            report.skipped_unmet.len()
        );
        Ok(report)
    }

    fn boot_module(
        &mut self,
        descriptor: &ModuleDescriptor,
        registry: &mut ModuleRegistry,
        overrides: &ConfigOverrides,
        host: &mut dyn HostCallbacks,
    ) -> Result<()> {
        let name = descriptor.name();
        log::debug!("Booting module '{}'", name);

        let layer = ConfigLayer::with_schema(
            descriptor.config_defaults().clone(),
            overrides.resolve(name),
            descriptor.config_schema(),
        )
        .map_err(|e| ModuleSystemError::boot(name, BootStep::Config, e.for_module(name)))?;

        let routes = descriptor.resources(ResourceKind::Routes);
        if !routes.is_empty() {
            log::debug!("Loading routes for '{}': {:?}", name, routes);
            host.load_routes(routes)
                .map_err(|e| ModuleSystemError::boot(name, BootStep::Routes, e))?;
        }

        let views = descriptor.resources(ResourceKind::Views);
        if !views.is_empty() {
            log::debug!("Loading views for '{}': {:?}", name, views);
            host.load_views(views, name)
                .map_err(|e| ModuleSystemError::boot(name, BootStep::Views, e))?;
        }

        let migrations = descriptor.resources(ResourceKind::Migrations);
        if !migrations.is_empty() {
            log::debug!("Loading migrations for '{}': {:?}", name, migrations);
            host.load_migrations(migrations)
                .map_err(|e| ModuleSystemError::boot(name, BootStep::Migrations, e))?;
        }

        let translations = descriptor.resources(ResourceKind::Translations);
        if !translations.is_empty() {
            log::debug!("Loading translations for '{}': {:?}", name, translations);
            host.load_translations(translations, name)
                .map_err(|e| ModuleSystemError::boot(name, BootStep::Translations, e))?;
        }

        if let Some(provider) = descriptor.provider() {
            let snapshot = layer.snapshot();
            let mut ctx = BootContext::new(name, &snapshot, registry);
            provider
                .boot(&mut ctx)
                .map_err(|e| ModuleSystemError::boot(name, BootStep::Provider, e))?;
        }

        self.configs.insert(name.to_string(), layer);
        self.booted.insert(name.to_string());
        self.boot_sequence.push(name.to_string());
        log::info!("Module '{}' booted", name);
        Ok(())
    }

    pub fn is_booted(&self, name: &str) -> bool {
        self.booted.contains(name)
    }

    /// Booted modules in the order they booted
    pub fn booted(&self) -> &[String] {
        &self.boot_sequence
    }

    /// Resolved configuration of a booted module
    pub fn config(&self, name: &str) -> Result<&ConfigLayer> {
        self.configs
            .get(name)
            .ok_or_else(|| ModuleSystemError::ModuleNotBooted { name: name.to_string() })
    }

    /// Mutable configuration of a booted module, for runtime overrides
    pub fn config_mut(&mut self, name: &str) -> Result<&mut ConfigLayer> {
        self.configs
            .get_mut(name)
            .ok_or_else(|| ModuleSystemError::ModuleNotBooted { name: name.to_string() })
    }

    /// Forget all boot state
    pub fn reset(&mut self) {
        self.booted.clear();
        self.boot_sequence.clear();
        self.configs.clear();
    }
}
