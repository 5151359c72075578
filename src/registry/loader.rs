//! Runtime lookup of optional module implementations.
//!
//! Some modules are legitimately absent from a given build: a debug-only
//! developer-tools integration ships in debug variants and nowhere else. The
//! original pattern for this was "look up a class by name and swallow any
//! failure"; here it is a capability lookup returning an explicit outcome. A
//! lookup never fails its caller: absence and internal lookup errors both let
//! the bootstrap continue, and the error cause travels to the diagnostics
//! sink only.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::module::Module;

/// Internal failure while attempting to resolve an optional module.
///
/// Non-fatal by construction: control flow treats it as "not found".
#[derive(Debug, Error)]
pub enum LoadError {
    /// The module's declared metadata could not be understood.
    #[error("malformed module metadata for {name}: {reason}")]
    MalformedMetadata { name: String, reason: String },

    /// The factory for the module panicked or reported an error.
    #[error("module factory for {name} failed: {reason}")]
    FactoryFailed { name: String, reason: String },
}

/// Result of one optional-module lookup.
#[derive(Clone)]
pub enum LoadOutcome {
    /// An implementation was resolved.
    Found(Arc<dyn Module>),
    /// Nothing is registered under that name; a normal, silent condition.
    NotFound,
    /// The attempt itself errored. Treated as `NotFound` for control flow;
    /// the cause is for diagnostics only.
    Failed(Arc<LoadError>),
}

impl std::fmt::Debug for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Found(m) => f.debug_tuple("Found").field(&m.id()).finish(),
            LoadOutcome::NotFound => f.write_str("NotFound"),
            LoadOutcome::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
        }
    }
}

/// Resolves optional module implementations by name at bootstrap time.
pub trait ConditionalLoader: Send + Sync {
    /// Attempt to resolve `name`. Never raises a fatal error for absence.
    fn try_load(&self, name: &str) -> LoadOutcome;
}

/// Factory producing a module implementation on demand.
pub type ModuleFactory =
    Arc<dyn Fn() -> Result<Arc<dyn Module>, LoadError> + Send + Sync>;

/// Loader backed by a static name → factory map.
///
/// Build variants differ only in which factories they install here; the
/// bootstrap code itself is identical across variants.
#[derive(Default, Clone)]
pub struct StaticLoader {
    factories: HashMap<String, ModuleFactory>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a factory under `name`, replacing any previous one.
    pub fn provide<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Module>, LoadError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Convenience for an already-constructed implementation.
    pub fn provide_instance(self, name: impl Into<String>, module: Arc<dyn Module>) -> Self {
        self.provide(name, move || Ok(module.clone()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl ConditionalLoader for StaticLoader {
    fn try_load(&self, name: &str) -> LoadOutcome {
        match self.factories.get(name) {
            None => LoadOutcome::NotFound,
            Some(factory) => match factory() {
                Ok(module) => LoadOutcome::Found(module),
                Err(e) => LoadOutcome::Failed(Arc::new(e)),
            },
        }
    }
}

/// Loader with nothing to offer; every lookup is `NotFound`.
///
/// The default for hosts that declare no optional modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyLoader;

impl ConditionalLoader for EmptyLoader {
    fn try_load(&self, _name: &str) -> LoadOutcome {
        LoadOutcome::NotFound
    }
}
