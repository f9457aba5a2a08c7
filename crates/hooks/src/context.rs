//! Ephemeral Kerberos protocol context.
//!
//! Every hook invocation opens its own context and drops it before
//! returning. Implementations release runtime resources in `Drop`, so every
//! exit path (including `?`) releases the context.

use std::sync::Arc;

use thiserror::Error;

use krb5_sync_core::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The runtime could not create a context.
    #[error("{0}")]
    Init(String),

    /// The principal could not be rendered to text.
    #[error("cannot unparse principal name: {0}")]
    Unparse(String),
}

impl ContextError {
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    pub fn unparse(msg: impl Into<String>) -> Self {
        Self::Unparse(msg.into())
    }
}

/// A live handle to the Kerberos runtime, scoped to one hook invocation.
pub trait ProtocolContext {
    /// Canonical textual form of `principal`.
    fn unparse_name(&self, principal: &Principal) -> Result<String, ContextError>;
}

/// Factory for protocol contexts.
///
/// Shared by all invocations, so it must be safe to call concurrently.
pub trait KerberosRuntime: Send + Sync {
    type Context: ProtocolContext;

    fn open(&self) -> Result<Self::Context, ContextError>;
}

impl<R: KerberosRuntime + ?Sized> KerberosRuntime for Arc<R> {
    type Context = R::Context;

    fn open(&self) -> Result<Self::Context, ContextError> {
        (**self).open()
    }
}

impl<R: KerberosRuntime + ?Sized> KerberosRuntime for &R {
    type Context = R::Context;

    fn open(&self) -> Result<Self::Context, ContextError> {
        (**self).open()
    }
}
