use serde_json::Value;

use crate::config::ConfigSnapshot;
use crate::extension::{ExtensionError, ExtensionRegistry, HandlerId};
use crate::kernel::error::BoxError;
use crate::module_system::registry::ModuleRegistry;

/// Boot hook supplied by a module, run after the host has loaded its resources
pub trait ModuleProvider: Send + Sync {
    fn boot(&self, ctx: &mut BootContext<'_>) -> Result<(), BoxError>;
}

/// Adapts a closure into a [`ModuleProvider`]
pub(crate) struct FnProvider<F>(pub(crate) F);

impl<F> ModuleProvider for FnProvider<F>
where
    F: Fn(&mut BootContext<'_>) -> Result<(), BoxError> + Send + Sync,
{
    fn boot(&self, ctx: &mut BootContext<'_>) -> Result<(), BoxError> {
        (self.0)(ctx)
    }
}

/// What a provider sees while its module boots: the frozen config and the registry.
///
/// Modules registered through the context during boot are not booted in the
/// same pass.
pub struct BootContext<'a> {
    module: &'a str,
    config: &'a ConfigSnapshot,
    registry: &'a mut ModuleRegistry,
}

impl<'a> BootContext<'a> {
    pub fn new(module: &'a str, config: &'a ConfigSnapshot, registry: &'a mut ModuleRegistry) -> Self {
        Self { module, config, registry }
    }

    /// Name of the module being booted
    pub fn module_name(&self) -> &str {
        self.module
    }

    pub fn config(&self) -> &ConfigSnapshot {
        self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &*self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut *self.registry
    }

    pub fn extensions(&mut self) -> &mut ExtensionRegistry {
        self.registry.extensions_mut()
    }

    /// Expose an extension point for other modules
    pub fn expose(&mut self, point: &str) {
        self.registry.extensions_mut().expose(point);
    }

    /// Attach a handler to an extension point, owned by the booting module
    pub fn attach<F>(&mut self, point: &str, handler: F) -> Result<HandlerId, ExtensionError>
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let owner = self.module;
        self.registry.extensions_mut().attach_from(point, owner, handler)
    }

    pub fn invoke(&self, point: &str, args: &[Value]) -> Result<Vec<Value>, ExtensionError> {
        self.registry.extensions().invoke(point, args)
    }
}
