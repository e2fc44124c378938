//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::infra::config::Logging;

/// Install a formatting subscriber filtered by `config.filter`. A subscriber that is already
/// installed is kept.
pub fn init(config: &Logging) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter '{}': {err}", config.filter);
        EnvFilter::new("info")
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
