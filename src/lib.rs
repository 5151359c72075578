//! bootseq library root
//!
//! A module registry and bootstrap sequencer: declare required and optional
//! integration modules, resolve a build-variant configuration, and let the
//! [`Bootstrapper`] initialize everything deterministically in
//! (priority, id) order, under per-module timeout budgets, with fail-soft
//! handling for optional modules.

pub mod core;
pub mod module;
pub mod observability;
pub mod registry;

// Root re-exports for the common surface
pub use crate::core::bootstrap::{BootstrapError, Bootstrapper, ReadyInfo};
pub use crate::core::config::{BootEnv, ConfigError, Configuration};
pub use crate::core::error::{Error, Result};
pub use crate::core::logging::init_logging;
pub use crate::core::state::BootstrapState;
pub use crate::module::{InitContext, InitError, Module};
pub use crate::observability::{DiagnosticsSink, MemorySink, Severity, TracingSink};
pub use crate::registry::{
    ConditionalLoader, EmptyLoader, FrozenRegistry, InitArgs, LoadError, LoadOutcome,
    ModuleDescriptor, ModuleEntry, ModuleRegistry, RegistryError, StaticLoader,
};

/// Prelude module that re-exports the most commonly used types and functions.
///
/// This is intended to provide a convenient way to import all the essential
/// types and functions with a single `use bootseq::prelude::*` statement.
pub mod prelude {
    pub use crate::core::bootstrap::{BootstrapError, Bootstrapper, ReadyInfo};
    pub use crate::core::config::{BootEnv, Configuration};
    pub use crate::core::error::{Error, Result};
    pub use crate::core::logging::init_logging;
    pub use crate::core::state::BootstrapState;
    pub use crate::module::{InitContext, InitError, Module};
    pub use crate::observability::{DiagnosticsSink, Severity, TracingSink};
    pub use crate::registry::{ConditionalLoader, ModuleDescriptor, StaticLoader};
}
