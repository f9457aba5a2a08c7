//! In-memory password store.
//!
//! Records every change it accepts instead of talking to a real directory or
//! kaserver. Intended for tests and dry runs. A failure can be scripted to
//! exercise the blocking (precommit) and advisory (postcommit) paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use krb5_sync_core::{Password, Principal, SyncConfig};
use krb5_sync_hooks::{PasswordStore, ProtocolContext, StoreError, Target};

/// A password change accepted by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedChange {
    pub target: Target,
    /// Principal as rendered by the protocol context.
    pub principal: String,
    /// Realm the store was configured for at the time of the change.
    pub realm: Option<String>,
    #[serde(skip)]
    pub password: Password,
    pub recorded_at: DateTime<Utc>,
}

/// Password store that keeps accepted changes in memory.
#[derive(Debug)]
pub struct RecordingStore {
    target: Target,
    changes: RwLock<Vec<RecordedChange>>,
    failure: RwLock<Option<StoreError>>,
    calls: AtomicUsize,
}

impl RecordingStore {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            changes: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn directory() -> Self {
        Self::new(Target::Directory)
    }

    pub fn legacy() -> Self {
        Self::new(Target::Legacy)
    }

    /// Fail every following call with `error`.
    pub fn fail_with(&self, error: StoreError) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Accept calls again.
    pub fn recover(&self) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Number of `change_password` calls, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn changes(&self) -> Vec<RecordedChange> {
        self.changes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn configured_realm(&self, config: &SyncConfig) -> Option<String> {
        match self.target {
            Target::Directory => config.directory.realm.clone(),
            Target::Legacy => config.legacy.realm.clone(),
        }
    }
}

impl PasswordStore for RecordingStore {
    fn change_password(
        &self,
        config: &SyncConfig,
        ctx: &dyn ProtocolContext,
        principal: &Principal,
        password: &Password,
    ) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(err);
        }

        let rendered = ctx
            .unparse_name(principal)
            .map_err(|e| StoreError::misconfigured(e.to_string()))?;

        let change = RecordedChange {
            target: self.target,
            principal: rendered,
            realm: self.configured_realm(config),
            password: password.clone(),
            recorded_at: Utc::now(),
        };
        debug!(
            target_store = %self.target,
            principal = %change.principal,
            "recorded password change"
        );

        self.changes
            .write()
            .map_err(|_| StoreError::unavailable("lock poisoned"))?
            .push(change);
        Ok(())
    }
}
