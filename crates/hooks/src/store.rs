//! External identity stores the new password is propagated to.
//!
//! Both stores are reached through one capability, [`PasswordStore`]; the
//! orchestrator picks which one to call through [`Target`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use krb5_sync_core::{Password, Principal, SyncConfig};

use crate::context::ProtocolContext;

/// Which external store a propagation goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Directory service (Active Directory). Propagated in precommit.
    Directory,
    /// Legacy authentication server (AFS kaserver). Propagated in postcommit.
    Legacy,
}

impl Target {
    /// Whether the configuration enables propagation to this store.
    pub fn is_enabled(&self, config: &SyncConfig) -> bool {
        match self {
            Target::Directory => config.directory.is_active(),
            Target::Legacy => config.legacy.is_active(),
        }
    }

    /// Hook phase this store is propagated in.
    pub fn phase(&self) -> &'static str {
        match self {
            Target::Directory => "precommit",
            Target::Legacy => "postcommit",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Directory => "directory",
            Target::Legacy => "legacy",
        }
    }
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an external store.
///
/// The message is written by the store for the administrator and is shown
/// verbatim; no variant adds a prefix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Required settings for this store are missing or invalid.
    #[error("{0}")]
    Misconfigured(String),

    /// Authenticating to the store with the configured key material failed.
    #[error("{0}")]
    Authentication(String),

    /// The store refused the new password.
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self::Misconfigured(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Authenticate to an external store and set a principal's password there.
///
/// Implementations read their own settings (keytab, admin principal, ...)
/// from `config` and may use `ctx` to authenticate. Calls are synchronous;
/// any timeout is the implementation's concern.
pub trait PasswordStore: Send + Sync {
    fn change_password(
        &self,
        config: &SyncConfig,
        ctx: &dyn ProtocolContext,
        principal: &Principal,
        password: &Password,
    ) -> Result<(), StoreError>;
}

impl<S: PasswordStore + ?Sized> PasswordStore for Arc<S> {
    fn change_password(
        &self,
        config: &SyncConfig,
        ctx: &dyn ProtocolContext,
        principal: &Principal,
        password: &Password,
    ) -> Result<(), StoreError> {
        (**self).change_password(config, ctx, principal, password)
    }
}

impl<S: PasswordStore + ?Sized> PasswordStore for &S {
    fn change_password(
        &self,
        config: &SyncConfig,
        ctx: &dyn ProtocolContext,
        principal: &Principal,
        password: &Password,
    ) -> Result<(), StoreError> {
        (**self).change_password(config, ctx, principal, password)
    }
}
