//! `krb5-sync-core` — configuration and identity primitives for password
//! propagation.
//!
//! This crate is pure: no Kerberos runtime, no network, no environment access.

pub mod config;
pub mod error;
pub mod password;
pub mod principal;
pub mod settings;

pub use config::{APP_NAMESPACE, DirectoryConfig, LegacyConfig, SyncConfig};
pub use error::{ErrorKind, SyncError, SyncResult};
pub use password::Password;
pub use principal::{Principal, PrincipalParseError};
pub use settings::{MapSettings, SettingsError, SettingsSource};
