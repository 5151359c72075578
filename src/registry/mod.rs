//! Module declarations, registration, and conditional lookup.

pub mod descriptor;
pub mod loader;
#[allow(clippy::module_inception)]
pub mod registry;

pub use descriptor::{InitArgs, ModuleDescriptor};
pub use loader::{ConditionalLoader, EmptyLoader, LoadError, LoadOutcome, ModuleFactory, StaticLoader};
pub use registry::{FrozenRegistry, ModuleEntry, ModuleRegistry, RegistryError};
