//! Subscriber initialization.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize logging, honouring `RUST_LOG`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Initialize logging with `directives` as the fallback filter.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_with_default(directives: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives));

    // JSON logs + timestamps. Password bytes never reach an event.
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::debug!(fallback = directives, "logging initialized");
    }
    installed
}
