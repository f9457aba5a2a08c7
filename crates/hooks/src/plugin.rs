//! Host-facing plugin boundary.
//!
//! The administration service loads the plugin once, calls
//! [`PasswordSyncPlugin::precommit_password`] before committing a password
//! change (non-zero aborts the change) and, only if the change committed,
//! [`PasswordSyncPlugin::postcommit_password`] (advisory only).

use tracing::debug;

use krb5_sync_core::{Password, Principal, SettingsSource, SyncConfig, SyncResult};

use crate::context::KerberosRuntime;
use crate::diagnostics::DiagnosticBuffer;
use crate::orchestrator;
use crate::outcome::{Advisory, Propagation};
use crate::store::PasswordStore;

/// Status returned to the host on success.
pub const STATUS_OK: i32 = 0;

/// A loaded password synchronization plugin.
///
/// Holds no mutable state: it may be shared across threads and invoked
/// concurrently for different principals.
#[derive(Debug)]
pub struct PasswordSyncPlugin<R, D, L> {
    config: SyncConfig,
    runtime: R,
    directory: D,
    legacy: L,
}

impl<R, D, L> PasswordSyncPlugin<R, D, L>
where
    R: KerberosRuntime,
    D: PasswordStore,
    L: PasswordStore,
{
    /// Load the configuration from `settings` and build the plugin.
    pub fn init<S>(settings: &S, runtime: R, directory: D, legacy: L) -> Self
    where
        S: SettingsSource + ?Sized,
    {
        Self::from_config(SyncConfig::load(settings), runtime, directory, legacy)
    }

    pub fn from_config(config: SyncConfig, runtime: R, directory: D, legacy: L) -> Self {
        Self {
            config,
            runtime,
            directory,
            legacy,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Unload the plugin, releasing its configuration.
    pub fn close(self) {
        debug!("password synchronization plugin closed");
    }

    /// Precommit hook. `Err` means the local change must not be committed.
    pub fn precommit(&self, principal: &Principal, password: &Password) -> SyncResult<Propagation> {
        orchestrator::precommit(
            &self.config,
            &self.runtime,
            &self.directory,
            principal,
            password,
        )
    }

    /// Postcommit hook. The result never affects the committed change.
    pub fn postcommit(&self, principal: &Principal, password: &Password) -> Advisory {
        orchestrator::postcommit(
            &self.config,
            &self.runtime,
            &self.legacy,
            principal,
            password,
        )
    }

    /// Precommit with the host's status-code contract.
    ///
    /// Returns [`STATUS_OK`] to let the change proceed; otherwise `diag`
    /// holds the reason.
    pub fn precommit_password(
        &self,
        principal: &Principal,
        password: &Password,
        diag: &mut DiagnosticBuffer,
    ) -> i32 {
        match self.precommit(principal, password) {
            Ok(_) => STATUS_OK,
            Err(err) => {
                diag.write(err.message());
                err.status_code()
            }
        }
    }

    /// Postcommit with the host's status-code contract. Advisory only.
    pub fn postcommit_password(
        &self,
        principal: &Principal,
        password: &Password,
        diag: &mut DiagnosticBuffer,
    ) -> i32 {
        match self.postcommit(principal, password) {
            Advisory::Ok(_) => STATUS_OK,
            Advisory::Failed(err) => {
                diag.write(err.message());
                err.status_code()
            }
        }
    }
}
