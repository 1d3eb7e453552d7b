//! # Trellis Core Kernel
//!
//! The `kernel` module holds what every other part of `trellis-core` leans on:
//!
//! - **Application**: [`Application`](bootstrap::Application) owns one module
//!   registry, its lifecycle driver and the host-supplied configuration
//!   overrides. Each application instance is independent; nothing is kept in
//!   global state.
//! - **Constants**: names and defaults shared by the CLI and module crates.
//! - **Error Handling**: the top-level [`Error`](error::Error) wrapping each
//!   subsystem error, and the crate-wide `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{BoxError, Error, Result};
// Test module declaration
#[cfg(test)]
mod tests;
