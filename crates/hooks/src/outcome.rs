//! Hook outcomes.

use serde::{Deserialize, Serialize};

use krb5_sync_core::SyncError;

/// What a hook did when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// The target store is not configured; nothing was attempted.
    Disabled,
    /// The principal is not eligible for propagation.
    Skipped,
    /// The target store accepted the new password.
    Propagated,
}

/// Result of the postcommit hook.
///
/// The local change is already durable when postcommit runs, so a failure
/// here is reported for logging only. `Advisory` intentionally does not
/// convert into a `Result`; hosts match on it or call [`Advisory::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    Ok(Propagation),
    Failed(SyncError),
}

impl Advisory {
    pub fn is_ok(&self) -> bool {
        matches!(self, Advisory::Ok(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Advisory::Failed(_))
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            Advisory::Failed(err) => Some(err),
            Advisory::Ok(_) => None,
        }
    }

    pub fn propagation(&self) -> Option<Propagation> {
        match self {
            Advisory::Ok(p) => Some(*p),
            Advisory::Failed(_) => None,
        }
    }
}
