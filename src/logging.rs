//! Logging initialisation
//!
//! Uses `tracing` and `tracing-subscriber`; the level filter comes from
//! `RUST_LOG` when set, otherwise from the configured `log_filter`.

use crate::config::HierarchyConfig;
use crate::shared::Result;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global fmt subscriber
///
/// # Environment
/// - RUST_LOG: level filter, e.g. `RUST_LOG=debug` or `RUST_LOG=wo_hierarchy=trace`
///
/// # Errors
/// Fails when the filter cannot be parsed or a global subscriber is already set.
///
/// # Example
/// ```no_run
/// use wo_hierarchy::config::HierarchyConfig;
/// use wo_hierarchy::logging;
///
/// logging::init(&HierarchyConfig::default()).unwrap();
/// ```
pub fn init(config: &HierarchyConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter)
            .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", config.log_filter, e))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

/// Installs a debug-level subscriber that writes through the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
