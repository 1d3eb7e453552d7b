#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::kernel::error::BoxError;
use crate::module_system::lifecycle::HostCallbacks;

/// Shared record of host calls, in the order they were made
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Host double that logs each resource load as `kind:namespace:paths`
#[derive(Default)]
pub struct MockHost {
    pub calls: CallLog,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, entry: String) -> Result<(), BoxError> {
        self.calls.lock().map_err(|e| e.to_string())?.push(entry);
        Ok(())
    }
}

impl HostCallbacks for MockHost {
    fn load_routes(&mut self, paths: &[String]) -> Result<(), BoxError> {
        self.push(format!("routes:{}", paths.join(",")))
    }

    fn load_views(&mut self, paths: &[String], namespace: &str) -> Result<(), BoxError> {
        self.push(format!("views:{}:{}", namespace, paths.join(",")))
    }

    fn load_migrations(&mut self, paths: &[String]) -> Result<(), BoxError> {
        self.push(format!("migrations:{}", paths.join(",")))
    }

    fn load_translations(&mut self, paths: &[String], namespace: &str) -> Result<(), BoxError> {
        self.push(format!("translations:{}:{}", namespace, paths.join(",")))
    }
}
