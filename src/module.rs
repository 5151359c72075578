//! The capability interface every integration module implements.
//!
//! A module is a unit of startup behavior with a declared identity and
//! priority: a crash reporter, an over-the-air update client, a deep-link
//! handler, and so on. The sequencer only ever talks to modules through this
//! trait; everything behind `init` belongs to the module itself.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::Configuration;
use crate::registry::descriptor::InitArgs;

/// Error returned by a module's `init`, or synthesized by the sequencer when
/// the init exceeds its timeout budget.
#[derive(Debug, Error)]
pub enum InitError {
    /// The module ran and reported a failure.
    #[error("module reported failure: {0}")]
    Failed(String),

    /// The sequencer gave up waiting for the module's `init`.
    #[error("initialization timed out after {0:?}")]
    TimedOut(Duration),

    /// Opaque failure from inside the module's own stack.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Read-only context handed to each module during initialization.
///
/// The configuration is shared by every module and must not be mutated; the
/// args are private to the module, taken from its descriptor.
#[derive(Debug, Clone, Copy)]
pub struct InitContext<'a> {
    pub config: &'a Configuration,
    pub args: &'a InitArgs,
}

/// An integration module as seen by the bootstrap sequencer.
///
/// `init` may block or await internally (contact a remote configuration
/// service, warm a cache), but the sequencer bounds it with a timeout budget
/// and never runs two inits concurrently.
#[async_trait]
pub trait Module: Send + Sync {
    /// Stable module identity. Must match the descriptor it was registered
    /// under.
    fn id(&self) -> &str;

    /// Initialization order; lower runs first.
    fn priority(&self) -> i32;

    /// Feature flags that must all be enabled for this module to be part of
    /// the built registry. Empty means unconditional.
    fn required_feature_flags(&self) -> Vec<String> {
        Vec::new()
    }

    /// One-shot initialization, invoked exactly once per process, strictly in
    /// registry order.
    async fn init(&self, ctx: InitContext<'_>) -> Result<(), InitError>;
}
