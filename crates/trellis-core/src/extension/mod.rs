//! # Trellis Core Extension Points
//!
//! Named, pre-declared slots that modules expose so other modules can attach
//! behaviour. A point is created with [`ExtensionRegistry::expose`]; handlers
//! are attached in order and invoked in that same order, fail-fast.
pub mod error;
pub mod registry;

pub use error::ExtensionError;
pub use registry::{ExtensionHandler, ExtensionPoint, ExtensionRegistry, HandlerId};
