//! Static declaration of one integration module.
//!
//! A descriptor is distinct from the runtime implementation it pairs with:
//! identity, ordering, and requirement level are declared here, while the
//! behavior lives behind the [`Module`](crate::module::Module) trait.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque configuration blob handed to the module at init time.
pub type InitArgs = serde_json::Value;

/// Identity, ordering, and requirement level of one module.
///
/// Two descriptors with the same `id` are a configuration conflict; the
/// registry rejects the second at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Unique module identity.
    pub id: String,

    /// Initialization order; lower runs first. Ties break on `id`.
    pub priority: i32,

    /// Whether a failed or timed-out `init` aborts the whole bootstrap.
    #[serde(default)]
    pub required: bool,

    /// Opaque configuration passed to the module's `init`.
    #[serde(default)]
    pub init_args: InitArgs,

    /// Per-module override of the sequencer's default init timeout budget.
    #[serde(default)]
    pub init_budget: Option<Duration>,
}

impl ModuleDescriptor {
    /// New optional descriptor with empty args and the default budget.
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            priority,
            required: false,
            init_args: InitArgs::Null,
            init_budget: None,
        }
    }

    /// Mark the module as required for startup.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Attach init-time args.
    pub fn with_args(mut self, args: InitArgs) -> Self {
        self.init_args = args;
        self
    }

    /// Override the init timeout budget for this module only.
    pub fn with_init_budget(mut self, budget: Duration) -> Self {
        self.init_budget = Some(budget);
        self
    }
}
