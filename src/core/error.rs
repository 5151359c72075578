//! Crate-level error and result types.
//!
//! Each concern keeps its own `thiserror` enum (`ConfigError`,
//! `RegistryError`, `LoadError`, `InitError`, `BootstrapError`); this module
//! folds them into one `Error` for callers that don't care which phase
//! failed.

use thiserror::Error;

use crate::core::bootstrap::BootstrapError;
use crate::core::config::ConfigError;
use crate::module::InitError;
use crate::registry::loader::LoadError;
use crate::registry::registry::RegistryError;

/// Any error the crate can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("module lookup error: {0}")]
    Load(#[from] LoadError),

    #[error("module init error: {0}")]
    Init(#[from] InitError),

    #[error("bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),
}

/// Convenience alias used across the crate's public surface.
pub type Result<T> = std::result::Result<T, Error>;
