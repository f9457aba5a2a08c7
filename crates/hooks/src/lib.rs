//! `krb5-sync-hooks` — precommit/postcommit password propagation hooks.
//!
//! Directory-service propagation runs in precommit and gates the local
//! password change. Legacy-store propagation runs in postcommit and is
//! advisory only. Both share one orchestration path, see [`orchestrator`].
//!
//! This crate holds no Kerberos or network code: the runtime and the two
//! external stores are reached through the traits in [`context`] and
//! [`store`].

pub mod context;
pub mod diagnostics;
pub mod filter;
pub mod orchestrator;
pub mod outcome;
pub mod plugin;
pub mod store;

pub use context::{ContextError, KerberosRuntime, ProtocolContext};
pub use diagnostics::DiagnosticBuffer;
pub use filter::eligible;
pub use orchestrator::{postcommit, precommit, propagate};
pub use outcome::{Advisory, Propagation};
pub use plugin::PasswordSyncPlugin;
pub use store::{PasswordStore, StoreError, Target};
