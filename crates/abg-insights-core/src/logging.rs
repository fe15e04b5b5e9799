//! `tracing` subscriber bootstrap.

use tracing_subscriber::EnvFilter;

use crate::config::CoreConfig;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over the configured filter. Returns false if a global
/// subscriber was already installed (by the host or an earlier call).
pub fn init_logging(config: &CoreConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
