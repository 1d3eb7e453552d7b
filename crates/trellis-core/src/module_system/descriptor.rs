use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use semver::Version;

use crate::config::{ConfigData, ConfigSchema};
use crate::kernel::constants::DEFAULT_MODULE_VERSION;
use crate::kernel::error::BoxError;
use crate::module_system::dependency::ModuleDependency;
use crate::module_system::provider::{BootContext, FnProvider, ModuleProvider};
use crate::module_system::version::VersionRange;

/// Kinds of resources a module hands to the host during boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Routes,
    Views,
    Migrations,
    Translations,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Routes,
        ResourceKind::Views,
        ResourceKind::Migrations,
        ResourceKind::Translations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Routes => "routes",
            ResourceKind::Views => "views",
            ResourceKind::Migrations => "migrations",
            ResourceKind::Translations => "translations",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "routes" => Ok(ResourceKind::Routes),
            "views" => Ok(ResourceKind::Views),
            "migrations" => Ok(ResourceKind::Migrations),
            "translations" => Ok(ResourceKind::Translations),
            other => Err(format!("unknown resource kind '{}'", other)),
        }
    }
}

/// Metadata for one module: identity, dependencies, resources, config and boot hook.
///
/// Built with the `with_*` methods, then handed to
/// [`ModuleRegistry::register`](crate::module_system::ModuleRegistry::register).
/// Once registered only the active flag can change.
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: String,
    version: Version,
    description: Option<String>,
    dependencies: Vec<ModuleDependency>,
    resources: BTreeMap<ResourceKind, Vec<String>>,
    active: bool,
    config_defaults: ConfigData,
    config_schema: ConfigSchema,
    provider: Option<Arc<dyn ModuleProvider>>,
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field("dependencies", &self.dependency_names())
            .field("resources", &self.resources)
            .field("active", &self.active)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

impl ModuleDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: Version::parse(DEFAULT_MODULE_VERSION).unwrap_or_else(|_| Version::new(0, 1, 0)),
            description: None,
            dependencies: Vec::new(),
            resources: BTreeMap::new(),
            active: true,
            config_defaults: ConfigData::new(),
            config_schema: ConfigSchema::new(),
            provider: None,
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Add a dependency. A second dependency on the same module replaces the first.
    pub fn with_dependency(mut self, dependency: ModuleDependency) -> Self {
        match self.dependencies.iter_mut().find(|d| d.name == dependency.name) {
            Some(existing) => *existing = dependency,
            None => self.dependencies.push(dependency),
        }
        self
    }

    /// Depend on any version of `name`
    pub fn depends_on(self, name: &str) -> Self {
        self.with_dependency(ModuleDependency::any(name))
    }

    /// Depend on `name` with a version constraint
    pub fn depends_on_version(self, name: &str, range: VersionRange) -> Self {
        self.with_dependency(ModuleDependency::with_range(name, range))
    }

    pub fn with_resource(mut self, kind: ResourceKind, path: &str) -> Self {
        self.resources.entry(kind).or_default().push(path.to_string());
        self
    }

    pub fn with_routes(self, path: &str) -> Self {
        self.with_resource(ResourceKind::Routes, path)
    }

    pub fn with_views(self, path: &str) -> Self {
        self.with_resource(ResourceKind::Views, path)
    }

    pub fn with_migrations(self, path: &str) -> Self {
        self.with_resource(ResourceKind::Migrations, path)
    }

    pub fn with_translations(self, path: &str) -> Self {
        self.with_resource(ResourceKind::Translations, path)
    }

    /// Register the module without booting it until activated
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_config_defaults(mut self, defaults: ConfigData) -> Self {
        self.config_defaults = defaults;
        self
    }

    pub fn with_config_schema(mut self, schema: ConfigSchema) -> Self {
        self.config_schema = schema;
        self
    }

    pub fn with_provider<P: ModuleProvider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Use a closure as the module's boot hook
    pub fn with_provider_fn<F>(self, f: F) -> Self
    where
        F: Fn(&mut BootContext<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.with_provider(FnProvider(f))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dependencies(&self) -> &[ModuleDependency] {
        &self.dependencies
    }

    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn depends_on_module(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }

    /// Paths declared for a resource kind, empty if none
    pub fn resources(&self, kind: ResourceKind) -> &[String] {
        self.resources.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn config_defaults(&self) -> &ConfigData {
        &self.config_defaults
    }

    pub fn config_schema(&self) -> &ConfigSchema {
        &self.config_schema
    }

    pub fn provider(&self) -> Option<&Arc<dyn ModuleProvider>> {
        self.provider.as_ref()
    }
}
