//! Error model for the propagation hooks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type returned by the propagation hooks.
pub type SyncResult<T> = Result<T, SyncError>;

/// Why a propagation attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The Kerberos runtime could not provide a context.
    Context,
    /// The external store failed or refused the change.
    Collaborator,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorKind::Context => f.write_str("context"),
            ErrorKind::Collaborator => f.write_str("collaborator"),
        }
    }
}

/// Structured failure of a precommit or postcommit hook.
///
/// The message is the human-readable reason handed back to the host; it is
/// displayed verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SyncError {
    kind: ErrorKind,
    message: String,
}

impl SyncError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn context(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Context, msg)
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Collaborator, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Non-zero status reported to a C-style host.
    pub fn status_code(&self) -> i32 {
        1
    }
}
