//! Logging initialization for hosts that don't install their own subscriber.
//!
//! `init_logging` is safe to call from every entry-point variant and from
//! tests: only the first call installs a subscriber, the rest are no-ops.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Install a global `tracing` subscriber filtered by `RUST_LOG`.
///
/// Output is human-readable by default; setting `BOOTSEQ_LOG_JSON=1` (or
/// `true`) switches to structured JSON lines for log shipping. If a global
/// subscriber is already installed this does nothing.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let json = std::env::var("BOOTSEQ_LOG_JSON")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        // try_init so an embedding host's subscriber wins quietly.
        if json {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .try_init();
        } else {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .try_init();
        }
    });
}
