use std::fmt;

use semver::Version;

use crate::module_system::version::VersionRange;

/// A dependency on another module, optionally pinned to a version range
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDependency {
    /// The name of the required module
    pub name: String,

    /// The version range that is acceptable; `None` accepts any version
    pub version_range: Option<VersionRange>,
}

impl ModuleDependency {
    /// Depend on any version of a module
    pub fn any(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version_range: None,
        }
    }

    /// Depend on a module whose version falls in `range`
    pub fn with_range(name: &str, range: VersionRange) -> Self {
        Self {
            name: name.to_string(),
            version_range: Some(range),
        }
    }

    /// Check if this dependency accepts the given module version
    pub fn is_compatible_with(&self, version: &Version) -> bool {
        self.version_range
            .as_ref()
            .is_none_or(|range| range.includes(version))
    }
}

impl fmt::Display for ModuleDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_range {
            Some(range) => write!(f, "{} ({})", self.name, range.constraint_string()),
            None => write!(f, "{} (any version)", self.name),
        }
    }
}
