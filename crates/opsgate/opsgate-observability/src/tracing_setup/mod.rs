//! Tracing setup: structured logging with span definitions and event helpers.

pub mod events;
pub mod spans;

use tracing_subscriber::EnvFilter;

use opsgate_core::config::ObservabilityConfig;

/// Environment variable consulted for the log filter.
pub const LOG_ENV: &str = "OPSGATE_LOG";

/// Initialize the global subscriber with JSON output.
///
/// Respects `OPSGATE_LOG`; defaults to `info`. Returns false when a
/// subscriber was already installed.
pub fn init_tracing() -> bool {
    init_with(&ObservabilityConfig::default())
}

/// Initialize from config. `OPSGATE_LOG` still takes precedence over
/// `log_level`.
pub fn init_with(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logs {
        builder
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .try_init()
            .is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

/// Initialize with an explicit filter string, for tests.
pub fn init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init()
        .is_ok()
}
