//! In-process Kerberos runtime.
//!
//! `LocalRuntime` hands out contexts that only know how to render principal
//! names. It keeps a count of live contexts so callers can verify that every
//! hook invocation released the context it opened.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use krb5_sync_core::Principal;
use krb5_sync_hooks::{ContextError, KerberosRuntime, ProtocolContext};

#[derive(Debug, Default)]
struct ScriptedFailure {
    remaining: usize,
    message: String,
}

/// Kerberos runtime with context accounting.
#[derive(Debug, Default)]
pub struct LocalRuntime {
    live: Arc<AtomicUsize>,
    opened: AtomicUsize,
    failure: Mutex<ScriptedFailure>,
}

impl LocalRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls to `open` fail with `message`.
    pub fn fail_next_opens(&self, count: usize, message: impl Into<String>) {
        let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        *failure = ScriptedFailure {
            remaining: count,
            message: message.into(),
        };
    }

    /// Contexts opened and not yet dropped.
    pub fn live_contexts(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Contexts successfully opened since construction.
    pub fn total_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl KerberosRuntime for LocalRuntime {
    type Context = LocalContext;

    fn open(&self) -> Result<LocalContext, ContextError> {
        {
            let mut failure = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
            if failure.remaining > 0 {
                failure.remaining -= 1;
                return Err(ContextError::init(failure.message.clone()));
            }
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(live, "opened Kerberos context");
        Ok(LocalContext {
            live: self.live.clone(),
        })
    }
}

/// A context from [`LocalRuntime`]; released on drop.
#[derive(Debug)]
pub struct LocalContext {
    live: Arc<AtomicUsize>,
}

impl ProtocolContext for LocalContext {
    fn unparse_name(&self, principal: &Principal) -> Result<String, ContextError> {
        if principal.realm().is_empty() {
            return Err(ContextError::unparse("principal has no realm"));
        }
        if principal.size() == 0 {
            return Err(ContextError::unparse("principal has no name components"));
        }
        Ok(principal.to_string())
    }
}

impl Drop for LocalContext {
    fn drop(&mut self) {
        let live = self.live.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!(live, "released Kerberos context");
    }
}
