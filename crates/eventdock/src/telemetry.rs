//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs the global `tracing` subscriber described by `logging`.
///
/// An unparsable level falls back to `info`. Returns `false` when a global
/// subscriber was already installed, which leaves the existing one active.
pub fn init_tracing(logging: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    match installed {
        Ok(()) => {
            tracing::debug!(level = %logging.level, json = logging.json, "tracing initialised");
            true
        }
        Err(_) => false,
    }
}
