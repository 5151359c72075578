//! The bootstrap sequencer.
//!
//! [`Bootstrapper`] owns the whole startup flow: resolve the configuration,
//! collect static and conditionally-discovered module registrations, freeze
//! them into a deterministic order, initialize each module strictly in that
//! order under a timeout budget, and hand the host runtime a [`ReadyInfo`].
//!
//! A required module's failure is fatal to the boot; an optional module's
//! absence or failure is recorded through the diagnostics sink and otherwise
//! invisible. The lifecycle is monotonic: one `start` per process, no
//! resets.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::config::{BootEnv, ConfigError, Configuration};
use crate::core::state::BootstrapState;
use crate::module::{InitContext, InitError, Module};
use crate::observability::{DiagnosticsSink, Severity, TracingSink};
use crate::registry::descriptor::ModuleDescriptor;
use crate::registry::loader::{ConditionalLoader, EmptyLoader, LoadOutcome};
use crate::registry::registry::{FrozenRegistry, ModuleRegistry, RegistryError};

/// Default per-module init timeout budget.
const DEFAULT_INIT_BUDGET: Duration = Duration::from_secs(5);

/// Errors that abort the bootstrap sequence.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Required configuration was missing or malformed while `Configuring`.
    #[error("configuration failed: {0}")]
    Config(#[from] ConfigError),

    /// A registration conflict, surfaced either at the registration call site
    /// or while resolving optional modules.
    #[error("registration failed: {0}")]
    Registry(#[from] RegistryError),

    /// A required module's init failed or timed out while `Initializing`.
    #[error("required module {module_id} failed to initialize: {source}")]
    RequiredModuleFailed {
        module_id: String,
        #[source]
        source: InitError,
    },

    /// An operation was invoked in the wrong lifecycle state.
    #[error("invalid lifecycle state: expected {expected:?}, currently {actual:?}")]
    InvalidState {
        expected: BootstrapState,
        actual: BootstrapState,
    },
}

/// What the host runtime needs once bootstrap reaches `Running`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadyInfo {
    /// Name of the top-level application component to run.
    pub entry_module: String,
    /// Debug build flag, exposed read-only.
    pub debug: bool,
}

/// Orchestrates configuration resolution, registry build, sequential module
/// initialization, and entry-point exposure.
///
/// Static modules are registered before [`start`]; optional module names are
/// declared and resolved through the [`ConditionalLoader`] during the
/// `Registering` phase. `start` runs at most once per process.
///
/// [`start`]: Bootstrapper::start
pub struct Bootstrapper {
    state: BootstrapState,
    registry: Option<ModuleRegistry>,
    optional_names: Vec<String>,
    loader: Arc<dyn ConditionalLoader>,
    sink: Arc<dyn DiagnosticsSink>,
    default_budget: Duration,
    config: Option<Arc<Configuration>>,
    frozen: Option<FrozenRegistry>,
}

impl Default for Bootstrapper {
    fn default() -> Self {
        Self::new(Arc::new(EmptyLoader))
    }
}

impl Bootstrapper {
    /// New sequencer resolving optional modules through `loader`.
    ///
    /// Diagnostics go to [`TracingSink`] unless replaced with
    /// [`with_sink`](Self::with_sink).
    pub fn new(loader: Arc<dyn ConditionalLoader>) -> Self {
        Self {
            state: BootstrapState::Uninitialized,
            registry: Some(ModuleRegistry::new()),
            optional_names: Vec::new(),
            loader,
            sink: Arc::new(TracingSink),
            default_budget: DEFAULT_INIT_BUDGET,
            config: None,
            frozen: None,
        }
    }

    /// Replace the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the default per-module init timeout budget.
    pub fn with_init_budget(mut self, budget: Duration) -> Self {
        self.default_budget = budget;
        self
    }

    /// Register a static module. Allowed only before `start`.
    ///
    /// Duplicate ids and identity mismatches fail at this call site so that
    /// configuration conflicts are caught by tests, not at runtime boot.
    pub fn register(
        &mut self,
        descriptor: ModuleDescriptor,
        module: Arc<dyn Module>,
    ) -> Result<(), BootstrapError> {
        if self.state != BootstrapState::Uninitialized {
            return Err(BootstrapError::InvalidState {
                expected: BootstrapState::Uninitialized,
                actual: self.state,
            });
        }
        let registry = match self.registry.as_mut() {
            Some(registry) => registry,
            None => {
                return Err(BootstrapError::InvalidState {
                    expected: BootstrapState::Uninitialized,
                    actual: self.state,
                })
            }
        };
        registry.register(descriptor, module)?;
        Ok(())
    }

    /// Declare an optional module name for conditional lookup during
    /// `Registering`. Duplicate declarations are collapsed.
    pub fn declare_optional(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.optional_names.contains(&name) {
            self.optional_names.push(name);
        }
    }

    /// Read-only lifecycle introspection.
    pub fn current_state(&self) -> BootstrapState {
        self.state
    }

    /// The resolved configuration, available from `Registering` onward.
    pub fn configuration(&self) -> Option<&Configuration> {
        self.config.as_deref()
    }

    /// The frozen module set, available once `Running`.
    pub fn modules(&self) -> Option<&FrozenRegistry> {
        self.frozen.as_ref()
    }

    /// Run the bootstrap sequence to completion.
    ///
    /// On success the sequencer is `Running` and the returned [`ReadyInfo`]
    /// names the entry module. On a configuration error the machine stays in
    /// `Configuring`; on a registration conflict raised while resolving
    /// optional modules it stays in `Registering`; on a required module
    /// failure it is `Failed`. Either way the error surfaces exactly once,
    /// with module and phase context.
    pub async fn start(&mut self, env: BootEnv) -> Result<ReadyInfo, BootstrapError> {
        if self.state != BootstrapState::Uninitialized {
            return Err(BootstrapError::InvalidState {
                expected: BootstrapState::Uninitialized,
                actual: self.state,
            });
        }

        // 1. Resolve configuration. Failure leaves the machine here: the
        //    terminal Failed state is reserved for module init failures.
        self.advance(BootstrapState::Configuring);
        let config = Arc::new(Configuration::resolve(&env)?);
        debug!(
            entry_module = %config.entry_module,
            debug_build = config.debug,
            features = config.enabled_features.len(),
            "configuration resolved"
        );

        // 2. Resolve declared optional modules and fold them into the
        //    registered set. Absence and lookup failure are fail-soft; a
        //    duplicate id is a declaration conflict and is not.
        self.advance(BootstrapState::Registering);
        let mut registry = self.registry.take().unwrap_or_default();
        for name in std::mem::take(&mut self.optional_names) {
            match self.loader.try_load(&name) {
                LoadOutcome::Found(module) => {
                    let descriptor = ModuleDescriptor::new(module.id(), module.priority());
                    registry.register(descriptor, module)?;
                    self.sink
                        .record(&name, Severity::Debug, "optional module resolved");
                }
                LoadOutcome::NotFound => {
                    self.sink.record(
                        &name,
                        Severity::Debug,
                        "optional module not present in this build; skipping",
                    );
                }
                LoadOutcome::Failed(cause) => {
                    self.sink.record(
                        &name,
                        Severity::Warning,
                        &format!("optional module lookup failed, treating as absent: {cause}"),
                    );
                }
            }
        }
        self.config = Some(config.clone());

        // 3. Freeze the registry and initialize strictly in order.
        let frozen = registry.build(&config);
        self.advance(BootstrapState::Initializing);
        let mut fatal: Option<(String, InitError)> = None;
        for entry in frozen.iter() {
            let module_id = entry.id();
            let budget = entry.descriptor.init_budget.unwrap_or(self.default_budget);
            let ctx = InitContext {
                config: &config,
                args: &entry.descriptor.init_args,
            };

            let result = match timeout(budget, entry.module.init(ctx)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(InitError::TimedOut(budget)),
            };

            match result {
                Ok(()) => {
                    self.sink.record(module_id, Severity::Debug, "initialized");
                }
                Err(source) if entry.descriptor.required => {
                    warn!(module_id = %module_id, error = %source, "required module failed; aborting bootstrap");
                    fatal = Some((module_id.to_string(), source));
                    break;
                }
                Err(source) => {
                    self.sink.record(
                        module_id,
                        Severity::Warning,
                        &format!("optional module init failed, continuing: {source}"),
                    );
                }
            }
        }

        self.frozen = Some(frozen);
        if let Some((module_id, source)) = fatal {
            self.advance(BootstrapState::Failed);
            return Err(BootstrapError::RequiredModuleFailed { module_id, source });
        }

        // 4. Expose the entry point; everything is immutable from here on.
        self.advance(BootstrapState::Running);
        info!(
            entry_module = %config.entry_module,
            debug_build = config.debug,
            modules = self.frozen.as_ref().map(FrozenRegistry::len).unwrap_or(0),
            "bootstrap complete"
        );

        Ok(ReadyInfo {
            entry_module: config.entry_module.clone(),
            debug: config.debug,
        })
    }

    fn advance(&mut self, next: BootstrapState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal bootstrap transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(from = ?self.state, to = ?next, "bootstrap state transition");
        self.state = next;
    }
}
