//! Logging setup for hosts and command-line drivers of the sync hooks.
//!
//! The hooks only emit `tracing` events; installing a subscriber is the
//! host's decision.

/// Install the JSON subscriber used by the password-sync hooks, filtered by
/// `RUST_LOG` or `info` when that is unset.
///
/// A host that already installed a subscriber keeps it.
pub fn init() {
    tracing::init();
}

/// JSON subscriber and `EnvFilter` defaults.
pub mod tracing;
