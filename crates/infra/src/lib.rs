//! Infrastructure adapters: Kerberos runtime, password stores, settings
//! sources.

pub mod runtime;
pub mod settings;
pub mod store;

pub use runtime::{LocalContext, LocalRuntime};
pub use settings::{EnvSettings, JsonSettings};
pub use store::{RecordedChange, RecordingStore};
