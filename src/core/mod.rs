//! Fundamental building blocks: bootstrap, state, errors, config, logging.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
