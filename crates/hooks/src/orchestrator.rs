//! Precommit and postcommit orchestration.
//!
//! Both hooks run the same sequence:
//!
//! 1. skip entirely if the target store is not configured (no context),
//! 2. open a fresh protocol context (failure is terminal for this call),
//! 3. skip principals with an instance,
//! 4. hand the change to the store and report its outcome unchanged.
//!
//! The context lives in a local binding, so it is dropped on every return
//! path. Nothing is retried.

use tracing::{debug, info, warn};

use krb5_sync_core::{Password, Principal, SyncConfig, SyncError, SyncResult};

use crate::context::{ContextError, KerberosRuntime};
use crate::filter;
use crate::outcome::{Advisory, Propagation};
use crate::store::{PasswordStore, Target};

/// Propagate a password change to `target` through `store`.
pub fn propagate<R, S>(
    target: Target,
    config: &SyncConfig,
    runtime: &R,
    store: &S,
    principal: &Principal,
    password: &Password,
) -> SyncResult<Propagation>
where
    R: KerberosRuntime + ?Sized,
    S: PasswordStore + ?Sized,
{
    if !target.is_enabled(config) {
        debug!(store = %target, phase = target.phase(), "password synchronization not configured");
        return Ok(Propagation::Disabled);
    }

    let ctx = runtime.open().map_err(context_failure)?;

    if !filter::eligible(&ctx, principal) {
        return Ok(Propagation::Skipped);
    }

    store
        .change_password(config, &ctx, principal, password)
        .map_err(|e| SyncError::collaborator(e.to_string()))?;

    info!(store = %target, phase = target.phase(), %principal, "propagated password change");
    Ok(Propagation::Propagated)
}

fn context_failure(err: ContextError) -> SyncError {
    SyncError::context(format!("failure initializing Kerberos library: {err}"))
}

/// Precommit hook: push the new password to the directory service.
///
/// An `Err` must abort the local password change.
pub fn precommit<R, S>(
    config: &SyncConfig,
    runtime: &R,
    directory: &S,
    principal: &Principal,
    password: &Password,
) -> SyncResult<Propagation>
where
    R: KerberosRuntime + ?Sized,
    S: PasswordStore + ?Sized,
{
    let span = tracing::debug_span!("precommit", %principal);
    let _entered = span.enter();

    propagate(
        Target::Directory,
        config,
        runtime,
        directory,
        principal,
        password,
    )
}

/// Postcommit hook: push the new password to the legacy store.
///
/// The local change is already committed; a failure is logged and returned
/// as [`Advisory::Failed`], never as an error the caller could propagate.
pub fn postcommit<R, S>(
    config: &SyncConfig,
    runtime: &R,
    legacy: &S,
    principal: &Principal,
    password: &Password,
) -> Advisory
where
    R: KerberosRuntime + ?Sized,
    S: PasswordStore + ?Sized,
{
    let span = tracing::debug_span!("postcommit", %principal);
    let _entered = span.enter();

    let outcome = propagate(
        Target::Legacy,
        config,
        runtime,
        legacy,
        principal,
        password,
    );
    match outcome {
        Ok(propagation) => Advisory::Ok(propagation),
        Err(err) => {
            warn!(
                kind = %err.kind(),
                error = %err,
                "legacy password synchronization failed; local change stands"
            );
            Advisory::Failed(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;

    use krb5_sync_core::{DirectoryConfig, ErrorKind, LegacyConfig};

    use super::*;
    use crate::context::ProtocolContext;
    use crate::store::StoreError;

    // Counts live contexts so leaks show up as a non-zero balance.
    #[derive(Default)]
    struct CountingRuntime {
        live: std::sync::Arc<AtomicUsize>,
        opened: AtomicUsize,
        fail: bool,
    }

    struct CountedContext {
        live: std::sync::Arc<AtomicUsize>,
    }

    impl ProtocolContext for CountedContext {
        fn unparse_name(&self, principal: &Principal) -> Result<String, ContextError> {
            Ok(principal.to_string())
        }
    }

    impl Drop for CountedContext {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl KerberosRuntime for CountingRuntime {
        type Context = CountedContext;

        fn open(&self) -> Result<CountedContext, ContextError> {
            if self.fail {
                return Err(ContextError::init("Cannot allocate memory"));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(CountedContext {
                live: self.live.clone(),
            })
        }
    }

    impl CountingRuntime {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn live(&self) -> usize {
            self.live.load(Ordering::SeqCst)
        }

        fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct StubStore {
        calls: AtomicUsize,
        failure: Option<String>,
        seen: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl StubStore {
        fn failing(msg: &str) -> Self {
            Self {
                failure: Some(msg.to_string()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PasswordStore for StubStore {
        fn change_password(
            &self,
            _config: &SyncConfig,
            ctx: &dyn ProtocolContext,
            principal: &Principal,
            password: &Password,
        ) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = ctx
                .unparse_name(principal)
                .map_err(|e| StoreError::misconfigured(e.to_string()))?;
            self.seen
                .lock()
                .unwrap()
                .push((name, password.as_bytes().to_vec()));
            match &self.failure {
                Some(msg) => Err(StoreError::rejected(msg.clone())),
                None => Ok(()),
            }
        }
    }

    fn directory_config() -> SyncConfig {
        SyncConfig::default().with_directory(DirectoryConfig {
            keytab: Some("/etc/krb5-sync/ad.keytab".into()),
            principal: Some("sync@EXAMPLE.COM".into()),
            realm: Some("EXAMPLE.COM".into()),
            admin_server: Some("dc1.example.com".into()),
        })
    }

    fn legacy_config() -> SyncConfig {
        SyncConfig::default().with_legacy(LegacyConfig {
            srvtab: Some("/etc/krb5-sync/afs.srvtab".into()),
            principal: Some("rcmd.sync".into()),
            realm: Some("example.com".into()),
        })
    }

    fn alice() -> Principal {
        Principal::user("alice", "EXAMPLE.COM")
    }

    #[test]
    fn precommit_propagates_to_directory() {
        let runtime = CountingRuntime::default();
        let store = StubStore::default();

        let config = directory_config();
        let pw = Password::from("s3cret");

        let result = precommit(&config, &runtime, &store, &alice(), &pw);

        assert_eq!(result, Ok(Propagation::Propagated));
        assert_eq!(store.calls(), 1);
        assert_eq!(
            store.seen.lock().unwrap().as_slice(),
            &[("alice@EXAMPLE.COM".to_string(), b"s3cret".to_vec())]
        );
        assert_eq!(runtime.live(), 0);
    }

    #[test]
    fn precommit_blocks_on_store_failure_with_verbatim_message() {
        let runtime = CountingRuntime::default();
        let store = StubStore::failing("ldap bind refused");
        let config = directory_config();

        let result = precommit(&config, &runtime, &store, &alice(), &"pw".into());
        let err = result.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Collaborator);
        assert_eq!(err.message(), "ldap bind refused");
        assert_eq!(runtime.live(), 0);
    }

    #[test]
    fn precommit_disabled_opens_nothing() {
        let runtime = CountingRuntime::default();
        let store = StubStore::default();
        let config = legacy_config();

        let result = precommit(&config, &runtime, &store, &alice(), &"pw".into());

        assert_eq!(result, Ok(Propagation::Disabled));
        assert_eq!(runtime.opened(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn context_failure_is_reported_with_library_prefix() {
        let runtime = CountingRuntime::failing();
        let store = StubStore::default();
        let config = directory_config();

        let result = precommit(&config, &runtime, &store, &alice(), &"pw".into());
        let err = result.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Context);
        assert_eq!(
            err.message(),
            "failure initializing Kerberos library: Cannot allocate memory"
        );
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn postcommit_context_failure_is_advisory() {
        let runtime = CountingRuntime::failing();
        let store = StubStore::default();
        let config = legacy_config();

        let advisory = postcommit(&config, &runtime, &store, &alice(), &"pw".into());

        assert!(advisory.is_failed());
        assert_eq!(advisory.propagation(), None);
        let kind = advisory.error().map(|e| e.kind());
        assert_eq!(kind, Some(ErrorKind::Context));
    }

    #[test]
    fn postcommit_failure_is_advisory() {
        let runtime = CountingRuntime::default();
        let store = StubStore::failing("kaserver unreachable");
        let config = legacy_config();

        let advisory = postcommit(&config, &runtime, &store, &alice(), &"pw".into());

        assert_eq!(
            advisory,
            Advisory::Failed(SyncError::collaborator("kaserver unreachable"))
        );
        assert_eq!(runtime.live(), 0);
    }

    #[test]
    fn postcommit_requires_every_legacy_field() {
        let runtime = CountingRuntime::default();
        let store = StubStore::default();
        let mut config = legacy_config();
        config.legacy.srvtab = None;

        let advisory = postcommit(&config, &runtime, &store, &alice(), &"pw".into());

        assert_eq!(advisory, Advisory::Ok(Propagation::Disabled));
        assert_eq!(advisory.propagation(), Some(Propagation::Disabled));
        assert_eq!(runtime.opened(), 0);
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn directory_realm_alone_still_attempts_propagation() {
        let runtime = CountingRuntime::default();
        let store = StubStore::failing("no keytab configured");
        let config = SyncConfig::default().with_directory(DirectoryConfig {
            realm: Some("EXAMPLE.COM".into()),
            ..Default::default()
        });

        let result = precommit(&config, &runtime, &store, &alice(), &"pw".into());

        assert_eq!(result, Err(SyncError::collaborator("no keytab configured")));
        assert_eq!(store.calls(), 1);
    }

    fn field() -> impl Strategy<Value = Option<String>> {
        prop::option::of("[a-z.]{1,8}")
    }

    prop_compose! {
        fn arb_config()(
            keytab in field(),
            principal in field(),
            realm in field(),
            admin_server in field(),
            srvtab in field(),
            afs_principal in field(),
            afs_realm in field(),
        ) -> SyncConfig {
            SyncConfig {
                directory: DirectoryConfig { keytab, principal, realm, admin_server },
                legacy: LegacyConfig { srvtab, principal: afs_principal, realm: afs_realm },
            }
        }
    }

    prop_compose! {
        fn arb_principal()(
            components in prop::collection::vec("[a-z0-9.]{1,8}", 1..4),
            realm in "[A-Z]{1,8}",
        ) -> Principal {
            Principal::new(components, realm)
        }
    }

    proptest! {
        /// Property: with the directory realm unset, precommit proceeds without
        /// opening a context or calling the store.
        #[test]
        fn unset_directory_realm_never_opens_context(
            mut config in arb_config(),
            principal in arb_principal(),
            password in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            config.directory.realm = None;
            let runtime = CountingRuntime::default();
            let store = StubStore::default();

            let password = Password::new(password);

            let result = precommit(&config, &runtime, &store, &principal, &password);

            prop_assert_eq!(result, Ok(Propagation::Disabled));
            prop_assert_eq!(runtime.opened(), 0);
            prop_assert_eq!(store.calls(), 0);
        }

        /// Property: principals with an instance never reach a store, whatever
        /// the configuration.
        #[test]
        fn instance_principals_never_reach_a_store(
            config in arb_config(),
            name in "[a-z]{1,8}",
            instances in prop::collection::vec("[a-z0-9.]{1,8}", 1..3),
        ) {
            let components = std::iter::once(name).chain(instances);
            let principal = Principal::new(components, "EXAMPLE.COM");
            let runtime = CountingRuntime::default();
            let store = StubStore::failing("must not be called");

            let pre = precommit(&config, &runtime, &store, &principal, &"pw".into());
            let post = postcommit(&config, &runtime, &store, &principal, &"pw".into());

            prop_assert!(pre.is_ok());
            prop_assert!(post.is_ok());
            prop_assert_eq!(store.calls(), 0);
            prop_assert_eq!(runtime.live(), 0);
        }

        /// Property: with the legacy group complete, postcommit calls the legacy
        /// store exactly once for a single-component principal.
        #[test]
        fn complete_legacy_config_calls_store_once(
            name in "[a-z]{1,8}",
            fails in any::<bool>(),
        ) {
            let runtime = CountingRuntime::default();
            let store = if fails {
                StubStore::failing("kaserver said no")
            } else {
                StubStore::default()
            };
            let principal = Principal::user(name, "EXAMPLE.COM");

            let config = legacy_config();

            let advisory = postcommit(&config, &runtime, &store, &principal, &"pw".into());

            prop_assert_eq!(store.calls(), 1);
            prop_assert_eq!(advisory.is_failed(), fails);
            prop_assert_eq!(runtime.live(), 0);
        }
    }
}
