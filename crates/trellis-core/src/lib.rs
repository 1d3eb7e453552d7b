pub mod config;
pub mod extension;
pub mod kernel;
pub mod module_system;

// Re-export key public types for the binary and module crates
pub use config::{ConfigData, ConfigLayer, ConfigOverrides, ConfigSchema, ConfigSnapshot};
pub use extension::{ExtensionRegistry, HandlerId};
pub use kernel::Application;
pub use kernel::error::{BoxError, Error as KernelError, Result};
pub use module_system::{
    BootContext, BootReport, HostCallbacks, HostLoaders, ModuleDescriptor, ModuleLifecycle,
    ModuleProvider, ModuleRegistry, ResourceKind,
};

#[cfg(test)]
mod tests;
