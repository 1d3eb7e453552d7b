//! # Trellis Core Module System
//!
//! Registers named, dependency-ordered modules and boots them into a host.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`descriptor`]**: [`ModuleDescriptor`], the metadata for one module
//!   (name, version, dependencies, resources, config defaults, provider).
//! - **[`registry`]**: [`ModuleRegistry`] validates registrations and yields
//!   modules in boot order.
//! - **[`lifecycle`]**: [`ModuleLifecycle`] boots active modules through the
//!   host's [`HostCallbacks`], resolving each module's configuration.
//! - **[`provider`]**: the [`ModuleProvider`] boot hook and its [`BootContext`].
//! - **[`manifest`]** and **[`loader`]**: module descriptions on disk and
//!   their discovery.
//! - **[`dependency`]** and **[`version`]**: dependency declarations with
//!   optional semver ranges.
//! - **[`error`]**: [`ModuleSystemError`](error::ModuleSystemError).
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod lifecycle;
pub mod loader;
pub mod manifest;
pub mod provider;
pub mod registry;
pub mod version;

pub use dependency::ModuleDependency;
pub use descriptor::{ModuleDescriptor, ResourceKind};
pub use error::{BootStep, ModuleSystemError};
pub use lifecycle::{BootReport, HostCallbacks, HostLoaders, ModuleLifecycle};
pub use loader::{DiscoveredModule, ManifestLoader};
pub use manifest::ModuleManifest;
pub use provider::{BootContext, ModuleProvider};
pub use registry::{BootOrder, ModuleRegistry};
pub use version::VersionRange;
