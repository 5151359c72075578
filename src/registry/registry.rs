//! Module registry: collects descriptors and implementations, then freezes
//! them into a deterministic, ordered set.
//!
//! The mutable [`ModuleRegistry`] exists only before first use; [`build`]
//! consumes it and yields a read-only [`FrozenRegistry`], so "no registration
//! after build" is enforced by the type system rather than by a runtime flag.
//!
//! [`build`]: ModuleRegistry::build

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::core::config::Configuration;
use crate::module::Module;
use crate::registry::descriptor::ModuleDescriptor;

/// Errors surfaced at registration time.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two descriptors were registered with the same `id`.
    #[error("duplicate module id: {id}")]
    DuplicateModule { id: String },

    /// A descriptor was paired with an implementation reporting a different
    /// identity.
    #[error("descriptor declares id {declared} but implementation reports {reported}")]
    IdentityMismatch { declared: String, reported: String },
}

/// One registered module: its static declaration plus its implementation.
#[derive(Clone)]
pub struct ModuleEntry {
    pub descriptor: ModuleDescriptor,
    pub module: Arc<dyn Module>,
}

impl ModuleEntry {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Pending, mutable collection of module registrations.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    // Keyed by id so duplicate detection is a plain map lookup; ordering is
    // established at build time, never by insertion order.
    pending: HashMap<String, ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor/implementation pair to the pending set.
    ///
    /// Fails immediately on a duplicate `id` or on a descriptor whose
    /// implementation reports a different identity, so configuration
    /// conflicts show up at the registration call site rather than at boot.
    pub fn register(
        &mut self,
        descriptor: ModuleDescriptor,
        module: Arc<dyn Module>,
    ) -> Result<(), RegistryError> {
        if descriptor.id != module.id() {
            return Err(RegistryError::IdentityMismatch {
                declared: descriptor.id,
                reported: module.id().to_string(),
            });
        }
        if self.pending.contains_key(&descriptor.id) {
            return Err(RegistryError::DuplicateModule { id: descriptor.id });
        }

        trace!(module_id = %descriptor.id, priority = descriptor.priority, "module registered");
        self.pending
            .insert(descriptor.id.clone(), ModuleEntry { descriptor, module });
        Ok(())
    }

    /// Whether an id is already pending.
    pub fn contains(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Number of pending registrations.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Freeze the registry against a configuration.
    ///
    /// Entries whose required feature flags are not all present in
    /// `config.enabled_features` are dropped; survivors are ordered by
    /// (`priority` ascending, `id` ascending). The result is a pure function
    /// of the registered set and the configuration; registration order never
    /// influences it, so initialization order is reproducible across builds.
    pub fn build(self, config: &Configuration) -> FrozenRegistry {
        let mut entries: Vec<ModuleEntry> = self
            .pending
            .into_values()
            .filter(|entry| {
                let flags = entry.module.required_feature_flags();
                let eligible = config.has_features(&flags);
                if !eligible {
                    debug!(
                        module_id = %entry.descriptor.id,
                        ?flags,
                        "module excluded: required feature flags not enabled"
                    );
                }
                eligible
            })
            .collect();

        entries.sort_by(|a, b| {
            (a.descriptor.priority, a.id()).cmp(&(b.descriptor.priority, b.id()))
        });

        debug!(modules = entries.len(), "registry frozen");
        FrozenRegistry { entries }
    }
}

/// The built, read-only module set, in initialization order.
#[derive(Debug, Clone, Default)]
pub struct FrozenRegistry {
    entries: Vec<ModuleEntry>,
}

impl FrozenRegistry {
    /// Entries in initialization order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter()
    }

    /// Ids in initialization order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&ModuleEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
