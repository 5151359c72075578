//! Bootstrap lifecycle state.
//!
//! The phases the original framework expressed as implicit callback order are
//! an explicit, monotonic state machine here. A process walks
//! `Uninitialized → Configuring → Registering → Initializing → Running` at
//! most once; `Failed` is terminal and reachable only from `Initializing`.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    Uninitialized,
    Configuring,
    Registering,
    Initializing,
    Running,
    Failed,
}

impl BootstrapState {
    /// Whether `next` is a legal successor of `self`.
    ///
    /// Transitions are monotonic; no state is ever re-entered within a
    /// process.
    pub fn can_transition_to(self, next: BootstrapState) -> bool {
        use BootstrapState::*;
        matches!(
            (self, next),
            (Uninitialized, Configuring)
                | (Configuring, Registering)
                | (Registering, Initializing)
                | (Initializing, Running)
                | (Initializing, Failed)
        )
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, BootstrapState::Running | BootstrapState::Failed)
    }
}
