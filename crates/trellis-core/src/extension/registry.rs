use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::extension::error::ExtensionError;
use crate::kernel::error::BoxError;

/// Identifier handed out when a handler is attached
pub type HandlerId = u64;

/// Callback attached to an extension point
pub type ExtensionHandler = Box<dyn Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync>;

struct AttachedHandler {
    id: HandlerId,
    owner: Option<String>,
    handler: ExtensionHandler,
}

/// A named slot holding handlers in attachment order
pub struct ExtensionPoint {
    name: String,
    handlers: Vec<AttachedHandler>,
}

impl fmt::Debug for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionPoint")
            .field("name", &self.name)
            .field("handler_ids", &self.handler_ids())
            .finish()
    }
}

impl ExtensionPoint {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            handlers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler ids in invocation order
    pub fn handler_ids(&self) -> Vec<HandlerId> {
        self.handlers.iter().map(|h| h.id).collect()
    }

    /// Owners of attached handlers in invocation order (`None` for anonymous handlers)
    pub fn owners(&self) -> Vec<Option<&str>> {
        self.handlers.iter().map(|h| h.owner.as_deref()).collect()
    }
}

/// Holds every exposed extension point for one application instance
pub struct ExtensionRegistry {
    points: HashMap<String, ExtensionPoint>,
    /// Exposure order, for stable listing
    order: Vec<String>,
    next_handler_id: HandlerId,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handler_count: usize = self.points.values().map(|p| p.len()).sum();
        f.debug_struct("ExtensionRegistry")
            .field("points", &self.order)
            .field("handler_count", &handler_count)
            .field("next_handler_id", &self.next_handler_id)
            .finish()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self {
            points: HashMap::new(),
            order: Vec::new(),
            next_handler_id: 1,
        }
    }

    /// Create the named point if absent; return the existing one otherwise
    pub fn expose(&mut self, name: &str) -> &ExtensionPoint {
        if !self.points.contains_key(name) {
            log::debug!("Exposing extension point '{}'", name);
            self.order.push(name.to_string());
        }
        self.points
            .entry(name.to_string())
            .or_insert_with(|| ExtensionPoint::new(name))
    }

    pub fn is_exposed(&self, name: &str) -> bool {
        self.points.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionPoint> {
        self.points.get(name)
    }

    /// Exposed point names in exposure order
    pub fn points(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Number of handlers on a point, `None` if it was never exposed
    pub fn handler_count(&self, name: &str) -> Option<usize> {
        self.points.get(name).map(ExtensionPoint::len)
    }

    /// Append an anonymous handler to a point
    pub fn attach<F>(&mut self, name: &str, handler: F) -> Result<HandlerId, ExtensionError>
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.attach_handler(name, None, Box::new(handler))
    }

    /// Append a handler on behalf of a module
    pub fn attach_from<F>(&mut self, name: &str, owner: &str, handler: F) -> Result<HandlerId, ExtensionError>
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.attach_handler(name, Some(owner.to_string()), Box::new(handler))
    }

    fn attach_handler(
        &mut self,
        name: &str,
        owner: Option<String>,
        handler: ExtensionHandler,
    ) -> Result<HandlerId, ExtensionError> {
        let point = self
            .points
            .get_mut(name)
            .ok_or_else(|| ExtensionError::UnknownExtensionPoint { name: name.to_string() })?;

        let id = self.next_handler_id;
        self.next_handler_id += 1;
        log::debug!(
            "Attaching handler {} to extension point '{}' (owner: {})",
            id,
            name,
            owner.as_deref().unwrap_or("<anonymous>")
        );
        point.handlers.push(AttachedHandler { id, owner, handler });
        Ok(id)
    }

    /// Remove a handler by id. Returns whether anything was removed.
    pub fn detach(&mut self, id: HandlerId) -> bool {
        let mut found = false;
        self.points.values_mut().for_each(|point| {
            let len_before = point.handlers.len();
            point.handlers.retain(|h| h.id != id);
            if point.handlers.len() < len_before {
                found = true;
            }
        });
        found
    }

    /// Call each handler in attachment order and collect the results.
    ///
    /// The first failing handler aborts the chain; no partial results are returned.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Vec<Value>, ExtensionError> {
        let point = self
            .points
            .get(name)
            .ok_or_else(|| ExtensionError::UnknownExtensionPoint { name: name.to_string() })?;

        let mut results = Vec::with_capacity(point.handlers.len());
        for attached in &point.handlers {
            let value = (attached.handler)(args).map_err(|source| ExtensionError::HandlerFailed {
                point: name.to_string(),
                handler_id: attached.id,
                owner: attached.owner.clone(),
                source,
            })?;
            results.push(value);
        }
        Ok(results)
    }
}
