use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigFormat;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::registry::ModuleRegistry;

type Result<T> = std::result::Result<T, ModuleSystemError>;

/// A manifest found on disk
#[derive(Debug, Clone)]
pub struct DiscoveredModule {
    pub path: PathBuf,
    pub manifest: ModuleManifest,
}

/// Finds module manifests in a directory and registers them dependencies-first.
///
/// Ordering only happens within the discovered set. A manifest may still
/// depend on a module registered earlier by other means (e.g. statically);
/// a dependency found nowhere fails at registration.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    dir: PathBuf,
}

impl ManifestLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parse every manifest file in the directory, in file-name order.
    ///
    /// A missing directory yields nothing.
    pub fn discover(&self) -> Result<Vec<DiscoveredModule>> {
        if !self.dir.exists() {
            log::debug!("Module directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let io_err = |e: std::io::Error| ModuleSystemError::Io {
            path: self.dir.clone(),
            operation: "read module dir".to_string(),
            source: e,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && ConfigFormat::from_path(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let manifest = ModuleManifest::from_path(&path)?;
                log::debug!("Discovered module '{}' at {}", manifest.name, path.display());
                Ok(DiscoveredModule { path, manifest })
            })
            .collect()
    }

    /// Discover, order and register every manifest. Returns the registered names.
    ///
    /// Stops at the first registration failure; modules registered before it stay registered.
    pub fn load_into(&self, registry: &mut ModuleRegistry) -> Result<Vec<String>> {
        let ordered = order_by_dependencies(self.discover()?)?;
        let mut names = Vec::with_capacity(ordered.len());
        for module in ordered {
            let path = module.path;
            let descriptor = module.manifest.into_descriptor().map_err(|e| match e {
                ModuleSystemError::InvalidManifest { message, .. } => ModuleSystemError::InvalidManifest {
                    path: Some(path.clone()),
                    message,
                },
                other => other,
            })?;
            names.push(descriptor.name().to_string());
            registry.register(descriptor)?;
        }
        Ok(names)
    }
}

/// Order modules so each follows the modules it depends on within the set.
///
/// Kahn's algorithm; ties keep the input order. Dependencies outside the set
/// are ignored here. A cycle fails with [`ModuleSystemError::DependencyCycle`].
pub fn order_by_dependencies(modules: Vec<DiscoveredModule>) -> Result<Vec<DiscoveredModule>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (idx, module) in modules.iter().enumerate() {
        positions.entry(module.manifest.name.as_str()).or_insert(idx);
    }

    let mut pending = vec![0usize; modules.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];
    for (idx, module) in modules.iter().enumerate() {
        let mut seen = Vec::new();
        for dep in module.manifest.dependency_names() {
            if let Some(&dep_idx) = positions.get(dep) {
                if dep_idx != idx && !seen.contains(&dep_idx) {
                    seen.push(dep_idx);
                    pending[idx] += 1;
                    dependents[dep_idx].push(idx);
                }
            }
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = pending
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(idx, _)| Reverse(idx))
        .collect();

    let mut sorted = Vec::with_capacity(modules.len());
    while let Some(Reverse(idx)) = ready.pop() {
        sorted.push(idx);
        for &dependent in &dependents[idx] {
            pending[dependent] -= 1;
            if pending[dependent] == 0 {
                ready.push(Reverse(dependent));
            }
        }
    }

    if sorted.len() != modules.len() {
        let mut cycle: Vec<String> = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(idx, _)| modules[idx].manifest.name.clone())
            .collect();
        cycle.sort();
        return Err(ModuleSystemError::DependencyCycle { modules: cycle });
    }

    let mut slots: Vec<Option<DiscoveredModule>> = modules.into_iter().map(Some).collect();
    Ok(sorted.into_iter().filter_map(|idx| slots[idx].take()).collect())
}
