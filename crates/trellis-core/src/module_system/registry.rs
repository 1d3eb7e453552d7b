use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use crate::extension::ExtensionRegistry;
use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::error::ModuleSystemError;

type Result<T> = std::result::Result<T, ModuleSystemError>;

/// Registry for the modules and extension points of one application instance.
///
/// A module can only depend on modules that are already registered, so the
/// dependency graph stays acyclic by construction and registration order is
/// always a valid boot order.
pub struct ModuleRegistry {
    /// Registered modules by name
    modules: HashMap<String, ModuleDescriptor>,
    /// Names in registration order, the tie-break for boot order
    insertion_order: Vec<String>,
    /// Extension points exposed by modules
    extensions: ExtensionRegistry,
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.insertion_order)
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            insertion_order: Vec::new(),
            extensions: ExtensionRegistry::new(),
        }
    }

    /// Register a module.
    ///
    /// Fails without touching the registry if the name is taken, or if any
    /// dependency is not registered yet or has an incompatible version.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<()> {
        let name = descriptor.name().to_string();

        if self.modules.contains_key(&name) {
            return Err(ModuleSystemError::DuplicateModule { name });
        }

        for dep in descriptor.dependencies() {
            // A self-dependency is never registered yet, so it lands here too
            let Some(registered) = self.modules.get(&dep.name) else {
                return Err(ModuleSystemError::UnknownDependency {
                    module: name,
                    dependency: dep.name.clone(),
                });
            };
            if !dep.is_compatible_with(registered.version()) {
                return Err(ModuleSystemError::IncompatibleDependency {
                    module: name,
                    dependency: dep.name.clone(),
                    required: dep
                        .version_range
                        .as_ref()
                        .map(|r| r.constraint_string().to_string())
                        .unwrap_or_default(),
                    found: registered.version().to_string(),
                });
            }
        }

        log::info!(
            "Registered module '{}' v{} (depends on: [{}])",
            name,
            descriptor.version(),
            descriptor.dependency_names().join(", ")
        );
        self.insertion_order.push(name.clone());
        self.modules.insert(name, descriptor);
        Ok(())
    }

    /// Get a module by name
    pub fn get(&self, name: &str) -> Result<&ModuleDescriptor> {
        self.modules.get(name).ok_or_else(|| ModuleSystemError::not_found(name))
    }

    /// Check if a module with the given name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.insertion_order.iter().map(String::as_str).collect()
    }

    pub fn is_active(&self, name: &str) -> Result<bool> {
        self.get(name).map(ModuleDescriptor::is_active)
    }

    /// Mark a module active. Its position in boot order is unchanged.
    pub fn activate(&mut self, name: &str) -> Result<()> {
        self.set_active(name, true)
    }

    /// Mark a module inactive so boot skips it. It stays registered.
    pub fn deactivate(&mut self, name: &str) -> Result<()> {
        self.set_active(name, false)
    }

    fn set_active(&mut self, name: &str, active: bool) -> Result<()> {
        let descriptor = self
            .modules
            .get_mut(name)
            .ok_or_else(|| ModuleSystemError::not_found(name))?;
        if descriptor.is_active() != active {
            log::info!("Module '{}' {}", name, if active { "activated" } else { "deactivated" });
        }
        descriptor.set_active(active);
        Ok(())
    }

    /// Modules in boot order: each after all of its dependencies, ties broken
    /// by registration order. Each call starts a fresh traversal.
    pub fn all(&self) -> BootOrder<'_> {
        BootOrder::new(self)
    }

    /// Boot order as owned names
    pub fn boot_order(&self) -> Vec<String> {
        self.all().map(|d| d.name().to_string()).collect()
    }

    /// Modules that directly depend on `name`, in registration order
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.insertion_order
            .iter()
            .filter(|id| self.modules.get(*id).is_some_and(|d| d.depends_on_module(name)))
            .map(String::as_str)
            .collect()
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.extensions
    }

    /// Drop every module and extension point
    pub fn clear(&mut self) {
        self.modules.clear();
        self.insertion_order.clear();
        self.extensions = ExtensionRegistry::new();
    }
}

/// Lazy traversal of a registry in boot order (Kahn's algorithm).
///
/// Among modules whose dependencies have all been yielded, the one registered
/// first comes next.
#[derive(Clone)]
pub struct BootOrder<'a> {
    registry: &'a ModuleRegistry,
    /// Number of not-yet-yielded dependencies per insertion index
    pending: Vec<usize>,
    /// Insertion indices of direct dependents per insertion index
    dependents: Vec<Vec<usize>>,
    ready: BinaryHeap<Reverse<usize>>,
}

impl<'a> BootOrder<'a> {
    fn new(registry: &'a ModuleRegistry) -> Self {
        let order = &registry.insertion_order;
        let positions: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();

        let mut pending = vec![0; order.len()];
        let mut dependents = vec![Vec::new(); order.len()];
        for (idx, name) in order.iter().enumerate() {
            let Some(descriptor) = registry.modules.get(name) else {
                continue;
            };
            for dep in descriptor.dependencies() {
                if let Some(&dep_idx) = positions.get(dep.name.as_str()) {
                    pending[idx] += 1;
                    dependents[dep_idx].push(idx);
                }
            }
        }

        let ready = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        Self {
            registry,
            pending,
            dependents,
            ready,
        }
    }
}

impl<'a> Iterator for BootOrder<'a> {
    type Item = &'a ModuleDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse(idx) = self.ready.pop()?;
        for &dependent in &self.dependents[idx] {
            self.pending[dependent] -= 1;
            if self.pending[dependent] == 0 {
                self.ready.push(Reverse(dependent));
            }
        }
        let name = &self.registry.insertion_order[idx];
        self.registry.modules.get(name)
    }
}
