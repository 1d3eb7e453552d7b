use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ConfigData, ConfigFormat, ConfigSchema};
use crate::module_system::dependency::ModuleDependency;
use crate::module_system::descriptor::{ModuleDescriptor, ResourceKind};
use crate::module_system::error::ModuleSystemError;
use crate::module_system::version::{VersionRange, parse_version};

/// A dependency as written in a manifest: either a bare name or a name with a version constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestDependency {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        version: Option<String>,
    },
}

impl ManifestDependency {
    pub fn name(&self) -> &str {
        match self {
            ManifestDependency::Name(name) => name,
            ManifestDependency::Detailed { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestResources {
    pub routes: Vec<String>,
    pub views: Vec<String>,
    pub migrations: Vec<String>,
    pub translations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Default values, nested tables allowed
    pub defaults: Map<String, Value>,
    /// Keys that must be present once overrides are applied
    pub required: Vec<String>,
    /// Keys restricted to a fixed set of strings
    pub one_of: BTreeMap<String, Vec<String>>,
}

fn default_active() -> bool {
    true
}

/// On-disk description of a module, in JSON, YAML or TOML.
///
/// ```toml
/// name = "blog"
/// version = "1.2.0"
/// dependencies = ["core", { name = "media", version = "^2" }]
///
/// [resources]
/// routes = ["routes/web.php"]
/// views = ["resources/views"]
///
/// [config]
/// required = ["per_page"]
/// [config.defaults]
/// per_page = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<ManifestDependency>,
    #[serde(default)]
    pub resources: ManifestResources,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub config: ManifestConfig,
}

impl ModuleManifest {
    /// Parse a manifest document
    pub fn from_str(content: &str, format: ConfigFormat) -> Result<Self, ModuleSystemError> {
        format.parse(content).map_err(|e| ModuleSystemError::InvalidManifest {
            path: None,
            message: e.to_string(),
        })
    }

    /// Read and parse a manifest file, picking the format from its extension
    pub fn from_path(path: &Path) -> Result<Self, ModuleSystemError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| ModuleSystemError::InvalidManifest {
            path: Some(path.to_path_buf()),
            message: "unsupported manifest format".to_string(),
        })?;
        let content = fs::read_to_string(path).map_err(|e| ModuleSystemError::Io {
            path: path.to_path_buf(),
            operation: "read manifest".to_string(),
            source: e,
        })?;
        Self::from_str(&content, format).map_err(|e| match e {
            ModuleSystemError::InvalidManifest { message, .. } => ModuleSystemError::InvalidManifest {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        })
    }

    /// Names of the modules this manifest depends on
    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies.iter().map(ManifestDependency::name).collect()
    }

    /// Convert into a descriptor, validating name, versions and constraints
    pub fn into_descriptor(self) -> Result<ModuleDescriptor, ModuleSystemError> {
        let invalid = |message: String| ModuleSystemError::InvalidManifest { path: None, message };

        if self.name.trim().is_empty() {
            return Err(invalid("module name must not be empty".to_string()));
        }

        let mut descriptor = ModuleDescriptor::new(&self.name);
        if let Some(version) = &self.version {
            descriptor = descriptor.with_version(parse_version(version)?);
        }
        if let Some(description) = &self.description {
            descriptor = descriptor.with_description(description);
        }

        for dep in &self.dependencies {
            let dependency = match dep {
                ManifestDependency::Name(name) => ModuleDependency::any(name),
                ManifestDependency::Detailed { name, version: None } => ModuleDependency::any(name),
                ManifestDependency::Detailed {
                    name,
                    version: Some(constraint),
                } => ModuleDependency::with_range(name, VersionRange::from_constraint(constraint)?),
            };
            descriptor = descriptor.with_dependency(dependency);
        }

        let resources = [
            (ResourceKind::Routes, &self.resources.routes),
            (ResourceKind::Views, &self.resources.views),
            (ResourceKind::Migrations, &self.resources.migrations),
            (ResourceKind::Translations, &self.resources.translations),
        ];
        for (kind, paths) in resources {
            for path in paths {
                descriptor = descriptor.with_resource(kind, path);
            }
        }

        let mut schema = ConfigSchema::new();
        for key in &self.config.required {
            schema = schema.require(key);
        }
        for (key, allowed) in &self.config.one_of {
            let allowed: Vec<&str> = allowed.iter().map(String::as_str).collect();
            schema = schema.one_of(key, &allowed);
        }

        descriptor = descriptor
            .with_config_defaults(ConfigData::from_map(self.config.defaults))
            .with_config_schema(schema);
        if !self.active {
            descriptor = descriptor.inactive();
        }
        Ok(descriptor)
    }
}
