//! Principal eligibility.

use tracing::debug;

use krb5_sync_core::Principal;

use crate::context::ProtocolContext;

/// Rendered in place of a principal name that cannot be unparsed.
pub const UNKNOWN_PRINCIPAL: &str = "???";

/// Whether a password change for `principal` may be propagated.
///
/// Principals with an instance (`alice/admin`) are managed separately in
/// each realm and are never propagated. Skipping one is a routing decision,
/// not a failure: it is only logged at debug level.
pub fn eligible<C>(ctx: &C, principal: &Principal) -> bool
where
    C: ProtocolContext + ?Sized,
{
    if principal.size() > 1 {
        let name = ctx
            .unparse_name(principal)
            .unwrap_or_else(|_| UNKNOWN_PRINCIPAL.to_string());
        debug!(
            principal = %name,
            "password synchronization skipping principal \"{name}\" with non-null instance"
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::context::ContextError;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_while<F: FnOnce()>(f: F) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        log.contents()
    }

    struct Renders;

    impl ProtocolContext for Renders {
        fn unparse_name(&self, principal: &Principal) -> Result<String, ContextError> {
            Ok(principal.to_string())
        }
    }

    struct CannotRender;

    impl ProtocolContext for CannotRender {
        fn unparse_name(&self, _principal: &Principal) -> Result<String, ContextError> {
            Err(ContextError::unparse("malformed"))
        }
    }

    #[test]
    fn single_component_is_eligible() {
        assert!(eligible(&Renders, &Principal::user("alice", "EXAMPLE.COM")));
    }

    #[test]
    fn instance_is_not_eligible() {
        let p = Principal::new(["alice", "admin"], "EXAMPLE.COM");
        assert!(!eligible(&Renders, &p));
    }

    #[test]
    fn unrenderable_instance_is_still_skipped() {
        let p = Principal::new(["host", "kdc.example.com"], "EXAMPLE.COM");
        assert!(!eligible(&CannotRender, &p));
    }

    #[test]
    fn unrenderable_single_component_is_not_inspected() {
        let p = Principal::user("alice", "EXAMPLE.COM");
        assert!(eligible(&CannotRender, &p));
    }

    #[test]
    fn skipped_principal_is_logged_by_name() {
        let p = Principal::new(["alice", "admin"], "EXAMPLE.COM");
        let log = logged_while(|| assert!(!eligible(&Renders, &p)));

        let expected = "skipping principal \"alice/admin@EXAMPLE.COM\" with non-null instance";
        assert!(log.contains("DEBUG"));
        assert!(log.contains(expected));
    }

    #[test]
    fn unrenderable_principal_is_logged_as_placeholder() {
        let p = Principal::new(["host", "kdc.example.com"], "EXAMPLE.COM");
        let log = logged_while(|| assert!(!eligible(&CannotRender, &p)));

        let expected = "skipping principal \"???\" with non-null instance";
        assert!(log.contains(expected));
    }

    #[test]
    fn eligible_principal_logs_nothing() {
        let alice = Principal::user("alice", "EXAMPLE.COM");
        let log = logged_while(|| assert!(eligible(&Renders, &alice)));
        assert!(log.is_empty());
    }
}
