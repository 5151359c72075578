//! Build-variant configuration, resolved once at process start.
//!
//! The host captures its environment into a [`BootEnv`] (from real process
//! environment variables or built by hand), and the sequencer resolves it
//! into an immutable [`Configuration`] during the `Configuring` phase. After
//! resolution nothing in the crate mutates the value; modules see it behind a
//! shared reference only.

use std::collections::BTreeSet;
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the top-level application component to run.
pub const ENV_ENTRY_MODULE: &str = "BOOTSEQ_ENTRY_MODULE";
/// Environment variable holding the debug-build flag.
pub const ENV_DEBUG: &str = "BOOTSEQ_DEBUG";
/// Environment variable holding the over-the-air update deployment key.
pub const ENV_DEPLOYMENT_KEY: &str = "BOOTSEQ_DEPLOYMENT_KEY";
/// Environment variable holding the comma-separated enabled-feature set.
pub const ENV_FEATURES: &str = "BOOTSEQ_FEATURES";

/// Errors resolving a [`Configuration`] from a [`BootEnv`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required configuration field missing: {0}")]
    MissingField(&'static str),

    #[error("configuration field {field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Raw, unresolved startup inputs as captured from the environment.
///
/// Every field is the string form the environment supplies; validation and
/// typing happen in [`Configuration::resolve`]. Tests and embedding hosts can
/// assemble one by hand with the `with_*` setters.
#[derive(Debug, Clone, Default)]
pub struct BootEnv {
    entry_module: Option<String>,
    debug: Option<String>,
    deployment_key: Option<String>,
    features: Option<String>,
}

impl BootEnv {
    /// Empty capture; useful as a builder seed in tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the `BOOTSEQ_*` variables from the process environment.
    pub fn from_process_env() -> Self {
        Self {
            entry_module: env::var(ENV_ENTRY_MODULE).ok(),
            debug: env::var(ENV_DEBUG).ok(),
            deployment_key: env::var(ENV_DEPLOYMENT_KEY).ok(),
            features: env::var(ENV_FEATURES).ok(),
        }
    }

    pub fn with_entry_module(mut self, name: impl Into<String>) -> Self {
        self.entry_module = Some(name.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(if debug { "1" } else { "0" }.to_string());
        self
    }

    pub fn with_deployment_key(mut self, key: impl Into<String>) -> Self {
        self.deployment_key = Some(key.into());
        self
    }

    /// Comma-separated feature flags, as the environment would supply them.
    pub fn with_features(mut self, features: impl Into<String>) -> Self {
        self.features = Some(features.into());
        self
    }
}

/// Resolved build-variant settings, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Debug build flag.
    pub debug: bool,

    /// Update-channel deployment key, absent in builds without OTA updates.
    pub deployment_key: Option<String>,

    /// Name of the top-level application component to hand to the host
    /// runtime once bootstrap completes.
    pub entry_module: String,

    /// Enabled feature flags; consulted when the registry is built.
    pub enabled_features: BTreeSet<String>,
}

impl Configuration {
    /// Resolve and validate a configuration from captured inputs.
    ///
    /// The entry-module name is the only required field: missing or blank is
    /// a [`ConfigError::MissingField`]. The debug flag accepts `1` or a
    /// case-insensitive `true`; anything else is false. Feature flags are
    /// split on commas and trimmed; blanks are dropped. A blank deployment
    /// key is treated as absent.
    pub fn resolve(env: &BootEnv) -> Result<Self, ConfigError> {
        let entry_module = match env.entry_module.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ConfigError::MissingField("entry_module")),
        };

        let debug = env
            .debug
            .as_deref()
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let deployment_key = env
            .deployment_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        let enabled_features = env
            .features
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            debug,
            deployment_key,
            entry_module,
            enabled_features,
        })
    }

    /// Whether every flag in `flags` is enabled.
    pub fn has_features<I, S>(&self, flags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        flags
            .into_iter()
            .all(|f| self.enabled_features.contains(f.as_ref()))
    }
}
