use std::path::Path;

use crate::config::{ConfigLayer, ConfigOverrides};
use crate::extension::ExtensionRegistry;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::module_system::{
    BootReport, HostCallbacks, ManifestLoader, ModuleDescriptor, ModuleLifecycle, ModuleRegistry,
};

/// One application instance: its modules, their boot state and the host's
/// configuration overrides.
///
/// Everything is owned here and handed out explicitly; two instances never
/// share state.
#[derive(Debug, Default)]
pub struct Application {
    registry: ModuleRegistry,
    lifecycle: ModuleLifecycle,
    overrides: ConfigOverrides,
}

impl Application {
    /// Creates an application with no modules and no overrides
    pub fn new() -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        Self::default()
    }

    /// Creates an application that applies `overrides` when modules boot
    pub fn with_overrides(overrides: ConfigOverrides) -> Self {
        let mut app = Self::new();
        app.overrides = overrides;
        app
    }

    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<()> {
        self.registry.register(descriptor)?;
        Ok(())
    }

    /// Register every manifest found in `dir`. Returns the registered names.
    pub fn load_manifests(&mut self, dir: &Path) -> Result<Vec<String>> {
        let names = ManifestLoader::new(dir).load_into(&mut self.registry)?;
        log::info!("Loaded {} module manifest(s) from {}", names.len(), dir.display());
        Ok(names)
    }

    pub fn activate(&mut self, name: &str) -> Result<()> {
        self.registry.activate(name)?;
        Ok(())
    }

    pub fn deactivate(&mut self, name: &str) -> Result<()> {
        self.registry.deactivate(name)?;
        Ok(())
    }

    /// Boot all active modules not yet booted
    pub fn boot(&mut self, host: &mut dyn HostCallbacks) -> Result<BootReport> {
        let report = self.lifecycle.boot_all(&mut self.registry, &self.overrides, host)?;
        Ok(report)
    }

    /// Resolved configuration of a booted module
    pub fn config(&self, module: &str) -> Result<&ConfigLayer> {
        Ok(self.lifecycle.config(module)?)
    }

    pub fn config_mut(&mut self, module: &str) -> Result<&mut ConfigLayer> {
        Ok(self.lifecycle.config_mut(module)?)
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    pub fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        self.registry.extensions()
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        self.registry.extensions_mut()
    }

    pub fn overrides(&self) -> &ConfigOverrides {
        &self.overrides
    }

    /// Overrides only affect modules that boot after the change
    pub fn overrides_mut(&mut self) -> &mut ConfigOverrides {
        &mut self.overrides
    }
}
