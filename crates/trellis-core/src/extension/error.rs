//! # Trellis Core Extension Errors
use thiserror::Error;

use crate::extension::registry::HandlerId;
use crate::kernel::error::BoxError;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension point '{name}' has not been exposed")]
    UnknownExtensionPoint { name: String },

    #[error("Handler {handler_id} on extension point '{point}'{} failed: {source}", owner.as_deref().map(|o| format!(" (attached by '{}')", o)).unwrap_or_default())]
    HandlerFailed {
        point: String,
        handler_id: HandlerId,
        owner: Option<String>,
        #[source]
        source: BoxError,
    },
}
